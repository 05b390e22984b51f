//! Plain-text rendering of the live pipeline.

use chrono::{DateTime, Utc};
use layerview_status::classify_app;
use layerview_sync::LiveView;
use layerview_topology::Topology;
use layerview_types::{format_relative, Application};
use std::fmt::Write;

fn app_line(out: &mut String, app: &Application, now: DateTime<Utc>) {
    let status = classify_app(app);
    let finished = format_relative(app.last_finished_at(), now);
    let _ = write!(
        out,
        "      {:<24} {:<12} {:<12} {:<14}",
        app.name(),
        status.sync.title,
        status.health.title,
        status.validation.title,
    );
    if !finished.is_empty() {
        let _ = write!(out, " {finished}");
    }
    out.push('\n');
}

/// Renders one recomputation as a block of text, ending in a newline.
pub fn render_summary(view: &LiveView, topology: &Topology, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "[{}] {} applications, revision {}",
        view.state,
        view.snapshot.total(),
        view.revision
    );
    if let Some(err) = &view.last_error {
        let _ = writeln!(out, "  last error: {err}");
    }

    for (index, stage) in topology.stages.iter().enumerate() {
        if index > 0 {
            let lit = topology
                .transitions
                .get(index - 1)
                .is_some_and(|t| t.lit);
            out.push_str(if lit { "   ⇣ flowing\n" } else { "   |\n" });
        }
        let marker = if stage.active { " *" } else { "" };
        let _ = writeln!(out, "stage {}{marker}", stage.rank);
        for layer in &stage.layers {
            let _ = writeln!(
                out,
                "  {:<16} {:<8} {} apps{}",
                layer.label,
                layer.health.as_str(),
                layer.apps.len(),
                if layer.active { " (active)" } else { "" }
            );
            if layer.apps.is_empty() {
                out.push_str("      No apps\n");
            }
            for app in &layer.apps {
                app_line(&mut out, app, now);
            }
        }
    }
    out
}
