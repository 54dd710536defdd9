//! Pure projections of transcript turns and profile datasets into display
//! structures. Nothing here touches the network or the session.

mod chart;
mod clipboard;
mod dataset;
mod markup;
mod sanitize;
mod theme;

pub use chart::{sparkline, ChartKind, ChartProjection, ChartSet};
pub use clipboard::{copy_quietly, osc52_sequence, Clipboard, Osc52Clipboard};
pub use dataset::{format_number, render_profile, Metric, PanelChart, ProfilePanel};
pub use markup::{parse as parse_markup, Block, Span, EMPTY_PLACEHOLDER};
pub use sanitize::strip_controls;
pub use theme::{Palette, Theme};

use crate::models::{Turn, TurnKind};

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTurn {
    pub kind: TurnKind,
    pub blocks: Vec<Block>,
    pub charts: Option<ChartSet>,
    /// Raw text offered by the copy action. Only assistant turns have one.
    pub copy_text: Option<String>,
    pub theme: Theme,
}

pub fn render_turn(turn: &Turn, theme: Theme) -> RenderedTurn {
    let blocks = match turn.kind() {
        // User text is shown as typed.
        TurnKind::User => vec![Block::Paragraph(vec![Span::plain(strip_controls(
            turn.content(),
        ))])],
        TurnKind::Assistant => markup::parse(turn.content()),
    };

    RenderedTurn {
        kind: turn.kind(),
        blocks,
        charts: turn.visualization().and_then(ChartSet::project),
        copy_text: (turn.kind() == TurnKind::Assistant).then(|| turn.content().to_string()),
        theme,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChartSeries, Series};

    #[test]
    fn assistant_turn_with_chart() {
        let chart = ChartSeries::new(
            vec!["A".to_string(), "B".to_string()],
            vec![Series {
                label: None,
                data: vec![10.0, 30.0],
            }],
        );
        let turn = Turn::assistant("# Result\n\n**B** wins", None, Some(chart));

        let rendered = render_turn(&turn, Theme::Light);

        assert_eq!(rendered.blocks.len(), 2);
        assert_eq!(rendered.copy_text.as_deref(), Some("# Result\n\n**B** wins"));
        assert_eq!(rendered.theme, Theme::Light);
        let charts = rendered.charts.expect("charts");
        assert_eq!(charts.line.points()[1], ("B".to_string(), 30.0));
    }

    #[test]
    fn user_turn_is_not_parsed_or_copyable() {
        let rendered = render_turn(&Turn::user("**not bold**"), Theme::Dark);

        assert_eq!(
            rendered.blocks,
            vec![Block::Paragraph(vec![Span::plain("**not bold**")])]
        );
        assert!(rendered.copy_text.is_none());
        assert!(rendered.charts.is_none());
    }

    #[test]
    fn terminal_escapes_are_stripped_from_every_field() {
        let chart = ChartSeries::new(
            vec!["A\x1b[2J".to_string()],
            vec![Series {
                label: Some("Reach\x1b]0;owned\x07".to_string()),
                data: vec![1.0],
            }],
        );
        let turn = Turn::assistant(
            "Engagement is up\x1b]52;c;cm0gLXJmIH4=\x07\x1b[2J",
            None,
            Some(chart),
        );

        let rendered = render_turn(&turn, Theme::Dark);

        assert_eq!(
            rendered.blocks[0].plain_text(),
            "Engagement is up]52;c;cm0gLXJmIH4=[2J"
        );
        let charts = rendered.charts.expect("charts");
        assert_eq!(charts.bar.labels, vec!["A[2J".to_string()]);
        assert_eq!(charts.bar.series[0].label.as_deref(), Some("Reach]0;owned"));

        let user = render_turn(&Turn::user("hi\x1b[2J"), Theme::Dark);
        assert_eq!(user.blocks[0].plain_text(), "hi[2J");
    }

    #[test]
    fn empty_assistant_text_renders_placeholder() {
        let rendered = render_turn(&Turn::assistant("", None, None), Theme::Dark);
        assert_eq!(rendered.blocks[0].plain_text(), EMPTY_PLACEHOLDER);
        assert_eq!(rendered.copy_text.as_deref(), Some(""));
    }
}
