use colored::Colorize;

use crate::progress::{ProgressFrame, STEPS, TITLE};
use crate::render::{Block, ChartSet, ProfilePanel, RenderedTurn, Span, Theme};
use crate::models::TurnKind;

pub const USER_LABEL: &str = "User";
pub const EMPTY_TITLE: &str = "New Chat";
pub const EMPTY_SUBTITLE: &str = "Start the analysing through chat";
pub const DEMO_DISCLAIMER: &str =
    "Disclaimer: This is a demo model trained on sample data for illustration purposes only";
pub const PENDING_LINE: &str = "Response generating...";

fn paint_spans(spans: &[Span], theme: Theme) -> String {
    let palette = theme.palette();
    spans
        .iter()
        .map(|span| {
            if span.bold {
                span.text.color(palette.heading).bold().to_string()
            } else {
                span.text.color(palette.text).to_string()
            }
        })
        .collect()
}

fn paint_blocks(blocks: &[Block], theme: Theme) -> Vec<String> {
    let palette = theme.palette();
    let mut lines = Vec::new();

    for block in blocks {
        match block {
            Block::Heading { level, spans } => {
                let text: String = spans.iter().map(|s| s.text.as_str()).collect();
                let heading = text.color(palette.heading).bold();
                lines.push(if *level <= 2 {
                    heading.underline().to_string()
                } else {
                    heading.to_string()
                });
            }
            Block::Paragraph(spans) => lines.push(paint_spans(spans, theme)),
            Block::List {
                ordered,
                start,
                items,
            } => {
                for (offset, item) in items.iter().enumerate() {
                    let marker = if *ordered {
                        format!("{}.", start + offset as u64)
                    } else {
                        "•".to_string()
                    };
                    lines.push(format!(
                        "  {} {}",
                        marker.color(palette.accent),
                        paint_spans(item, theme)
                    ));
                }
            }
        }
    }
    lines
}

pub fn paint_charts(charts: &ChartSet, theme: Theme) -> Vec<String> {
    let palette = theme.palette();
    let mut lines = Vec::new();

    for (index, chart) in charts.iter().enumerate() {
        let color = palette.chart[index % palette.chart.len()];
        lines.push(format!("  {}", chart.title().color(palette.heading).bold()));
        for line in chart.draw() {
            lines.push(format!("    {}", line.color(color)));
        }
    }
    lines
}

/// Paint one transcript entry under the given assistant label.
pub fn paint_turn(turn: &RenderedTurn, assistant_label: &str) -> String {
    let palette = turn.theme.palette();
    let label = match turn.kind {
        TurnKind::User => USER_LABEL.color(palette.user_label).bold(),
        TurnKind::Assistant => assistant_label.color(palette.assistant_label).bold(),
    };

    let mut lines = vec![label.to_string()];
    lines.extend(paint_blocks(&turn.blocks, turn.theme));
    if let Some(charts) = &turn.charts {
        lines.extend(paint_charts(charts, turn.theme));
    }
    if turn.copy_text.is_some() {
        lines.push("(/copy to copy this reply)".color(palette.muted).to_string());
    }

    lines.join("\n") + "\n\n"
}

pub fn paint_empty_state(theme: Theme, disclaimer: bool) -> String {
    let palette = theme.palette();
    let mut lines = vec![
        EMPTY_TITLE.color(palette.heading).bold().to_string(),
        EMPTY_SUBTITLE.color(palette.muted).to_string(),
    ];
    if disclaimer {
        lines.push(DEMO_DISCLAIMER.color(palette.muted).italic().to_string());
    }
    lines.join("\n") + "\n\n"
}

pub fn paint_pending(theme: Theme) -> String {
    format!("{}\n", PENDING_LINE.color(theme.palette().muted).italic())
}

/// Status line redrawn in place while the profile loads.
pub fn paint_progress(frame: &ProgressFrame, theme: Theme) -> String {
    let palette = theme.palette();
    format!(
        "\r\x1b[2K{}{} {} {}",
        frame.phrase().color(palette.accent),
        frame.ellipsis().color(palette.accent),
        "Processing".color(palette.muted),
        frame.countdown().color(palette.accent)
    )
}

pub fn paint_progress_header(theme: Theme) -> String {
    let palette = theme.palette();
    let mut lines = vec![TITLE.color(palette.heading).bold().to_string()];
    lines.extend(STEPS.iter().map(|step| format!("  • {}", step.color(palette.muted))));
    lines.push("Est. time: 2 min".color(palette.muted).to_string());
    lines.join("\n") + "\n"
}

pub fn paint_profile(panel: &ProfilePanel) -> String {
    let palette = panel.theme.palette();
    let mut lines = Vec::new();

    let mut header = panel.display_name.color(palette.heading).bold().to_string();
    if panel.is_verified {
        header.push_str(&format!(" {}", "✔".color(palette.accent)));
    }
    lines.push(header);
    lines.push(format!("@{}", panel.handle).color(palette.muted).to_string());
    if let Some(bio) = &panel.biography {
        lines.push(bio.color(palette.text).to_string());
    }
    if let Some(url) = &panel.external_url {
        lines.push(url.color(palette.accent).underline().to_string());
    }
    lines.push(String::new());

    for metric in panel.primary.iter().chain(panel.details.iter()) {
        lines.push(format!(
            "  {:<18} {}",
            metric.label.color(palette.muted),
            metric.value.color(palette.heading).bold()
        ));
    }
    lines.push(String::new());

    for (index, chart) in panel.charts.iter().enumerate() {
        let color = palette.chart[index % palette.chart.len()];
        lines.push(format!(
            "  {:<26} {}",
            chart.title.color(palette.heading),
            chart.draw().color(color)
        ));
    }

    lines.join("\n") + "\n\n"
}
