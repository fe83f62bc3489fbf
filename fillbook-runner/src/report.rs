//! Markdown report generator.

use crate::runner::TapeRunResult;
use fillbook_core::{CloseDirection, RealizedPnl};

pub struct MarkdownReportGenerator;

impl MarkdownReportGenerator {
    pub fn generate(&self, result: &TapeRunResult) -> String {
        let summary = &result.summary;
        let mut report = format!(
            "# Fillbook PnL Report\n\n\
Report ID: `{}`\n\n\
## Summary\n\
- Realized PnL: ${:+.2}\n\
- Closing events: {}\n\
- Win rate: {:.1}%\n\
- Profit factor: {}\n\
- Largest win: ${:+.2}\n\
- Largest loss: ${:+.2}\n\
- Instruments: {}\n\
- Open positions: {}\n",
            result.report_id,
            summary.total_pnl,
            summary.event_count,
            summary.win_rate * 100.0,
            format_profit_factor(summary.profit_factor),
            summary.largest_win,
            summary.largest_loss,
            result.per_instrument.len(),
            result.open_positions().count(),
        );

        if !result.per_instrument.is_empty() {
            report.push_str("\n## Per Instrument\n\n");
            report.push_str("| Instrument | Events | Realized PnL | Win Rate | Largest Win | Largest Loss |\n");
            report.push_str("|------------|--------|--------------|----------|-------------|--------------|\n");
            for instrument in result.per_instrument.values() {
                report.push_str(&format!(
                    "| {} | {} | ${:+.2} | {:.1}% | ${:+.2} | ${:+.2} |\n",
                    instrument.symbol,
                    instrument.event_count,
                    instrument.total_pnl,
                    instrument.win_rate * 100.0,
                    instrument.largest_win,
                    instrument.largest_loss,
                ));
            }
        }

        // Event tape section (top 5 winners and losers)
        if !result.events.is_empty() {
            let mut sorted: Vec<&RealizedPnl> = result.events.iter().collect();
            sorted.sort_by(|a, b| b.pnl.partial_cmp(&a.pnl).unwrap_or(std::cmp::Ordering::Equal));

            report.push_str("\n## Top Winners\n");
            report.push_str("| Instrument | Close | Qty | Entry | Exit | PnL |\n");
            report.push_str("|------------|-------|-----|-------|------|-----|\n");
            for event in sorted.iter().take(5).filter(|e| e.pnl > 0.0) {
                report.push_str(&event_row(event));
            }

            report.push_str("\n## Top Losers\n");
            report.push_str("| Instrument | Close | Qty | Entry | Exit | PnL |\n");
            report.push_str("|------------|-------|-----|-------|------|-----|\n");
            for event in sorted.iter().rev().take(5).filter(|e| e.pnl <= 0.0) {
                report.push_str(&event_row(event));
            }
        }

        let open: Vec<_> = result.open_positions().collect();
        if !open.is_empty() {
            report.push_str("\n## Open Positions\n");
            report.push_str("| Instrument | Side | Qty | Avg Entry | Opened |\n");
            report.push_str("|------------|------|-----|-----------|--------|\n");
            for position in open {
                let side = if position.is_long() { "Long" } else { "Short" };
                let opened = position
                    .opened_at
                    .map(|ts| ts.to_rfc3339())
                    .unwrap_or_default();
                report.push_str(&format!(
                    "| {} | {} | {} | {:.4} | {} |\n",
                    position.symbol,
                    side,
                    position.open_quantity(),
                    position.avg_entry_price,
                    opened,
                ));
            }
        }

        report
    }
}

fn event_row(event: &RealizedPnl) -> String {
    let close = match event.direction {
        CloseDirection::SellToCloseLong => "Sell-to-close",
        CloseDirection::BuyToCoverShort => "Buy-to-cover",
    };
    format!(
        "| {} | {} | {} | {:.4} | {:.4} | ${:+.2} |\n",
        event.symbol, close, event.closed_quantity, event.entry_price, event.exit_price, event.pnl,
    )
}

fn format_profit_factor(pf: f64) -> String {
    if pf.is_infinite() {
        "inf".to_string()
    } else {
        format!("{:.2}", pf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::run_tape;
    use chrono::{TimeZone, Utc};
    use fillbook_core::{Fill, FillId, Instruments, Side};

    fn sample_result() -> TapeRunResult {
        let config = Instruments::new()
            .with_instrument("MNQ", 2.0)
            .unwrap()
            .with_instrument("ES", 50.0)
            .unwrap();
        let ts = |s: u32| Utc.with_ymd_and_hms(2024, 3, 4, 14, 30, s).unwrap();
        let tape = vec![
            Fill {
                id: FillId::from(1),
                timestamp: ts(0),
                symbol: "MNQ".into(),
                side: Side::Buy,
                quantity: 2,
                price: 100.0,
            },
            Fill {
                id: FillId::from(2),
                timestamp: ts(1),
                symbol: "MNQ".into(),
                side: Side::Sell,
                quantity: 2,
                price: 110.0,
            },
            Fill {
                id: FillId::from(3),
                timestamp: ts(2),
                symbol: "ES".into(),
                side: Side::Sell,
                quantity: 1,
                price: 5000.0,
            },
        ];
        run_tape(&tape, &config).unwrap()
    }

    #[test]
    fn report_contains_summary_and_tables() {
        let result = sample_result();
        let report = MarkdownReportGenerator.generate(&result);

        assert!(report.contains("# Fillbook PnL Report"));
        assert!(report.contains(&result.report_id));
        assert!(report.contains("- Realized PnL: $+40.00"));
        assert!(report.contains("## Per Instrument"));
        assert!(report.contains("## Top Winners"));
        assert!(report.contains("| MNQ | Sell-to-close | 2 | 100.0000 | 110.0000 | $+40.00 |"));
        // ES short is still open
        assert!(report.contains("## Open Positions"));
        assert!(report.contains("| ES | Short | 1 | 5000.0000 |"));
    }

    #[test]
    fn profit_factor_formats_infinity() {
        assert_eq!(format_profit_factor(f64::INFINITY), "inf");
        assert_eq!(format_profit_factor(1.5), "1.50");
    }
}
