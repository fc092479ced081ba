// CSV and Markdown exports of a ranked prop list.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use thiserror::Error;

use super::scoring::{ev_tier, prop_confidence};
use crate::prop::{format_number, format_odds, PropRecord};

/// Column order of the CSV export.
pub const EXPORT_COLUMNS: [&str; 15] = [
    "player",
    "stat",
    "line",
    "projection",
    "proj_line_gap",
    "model_prob_pct",
    "book_prob_pct",
    "edge_pct",
    "ev_pct",
    "odds",
    "opponent",
    "position",
    "dvp_mult",
    "n_games",
    "injury",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub fn default_csv_name(now: NaiveDateTime) -> String {
    format!("prop_analysis_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

pub fn default_markdown_name(now: NaiveDateTime) -> String {
    format!("prop_report_{}.md", now.format("%Y%m%d_%H%M%S"))
}

fn fixed(v: f64, places: usize) -> String {
    format!("{v:.places$}")
}

fn export_row(p: &PropRecord) -> [String; 15] {
    [
        p.player.clone(),
        p.stat.clone(),
        format_number(p.line),
        fixed(p.projection, 2),
        fixed(p.proj_line_gap(), 2),
        fixed(p.model_prob_pct(), 2),
        fixed(p.book_prob_pct(), 2),
        fixed(p.edge_pct(), 2),
        fixed(p.ev_pct(), 2),
        p.odds.to_string(),
        p.opponent.clone().unwrap_or_default(),
        p.position.clone().unwrap_or_default(),
        p.dvp_mult.map(|v| fixed(v, 3)).unwrap_or_default(),
        p.n_games.to_string(),
        p.injury.clone().unwrap_or_default(),
    ]
}

/// Header plus one row per prop, in the given order. An empty list still
/// produces the header.
pub fn write_csv<W: Write>(props: &[PropRecord], writer: W) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(EXPORT_COLUMNS)?;
    for p in props {
        wtr.write_record(export_row(p))?;
    }
    wtr.flush().map_err(|e| ExportError::Csv(e.into()))?;
    Ok(())
}

/// Returns the number of rows written.
pub fn export_csv(props: &[PropRecord], path: &Path) -> Result<usize, ExportError> {
    let file = std::fs::File::create(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_csv(props, file)?;
    Ok(props.len())
}

/// Report of the first `top_n` props in their current order.
pub fn render_markdown(props: &[PropRecord], top_n: usize, generated_at: NaiveDateTime) -> String {
    let shown = props.len().min(top_n);
    let mut out = String::new();
    out.push_str("# PropPulse Analysis Report\n");
    out.push_str(&format!(
        "**Generated:** {}\n\n",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(&format!("**Total Props Analyzed:** {}\n\n", props.len()));
    out.push_str("---\n\n");
    out.push_str(&format!("## Top {shown} Props\n\n"));

    if shown == 0 {
        out.push_str("_No props matched._\n");
        return out;
    }

    for (i, p) in props.iter().take(shown).enumerate() {
        let tier = ev_tier(p);
        let confidence = prop_confidence(p);
        out.push_str(&format!(
            "### {}. {} {} - {} {}\n\n",
            i + 1,
            tier.emoji(),
            p.player,
            p.stat,
            format_number(p.line)
        ));
        out.push_str(&format!("- **Tier:** {}\n", tier.label()));
        out.push_str(&format!(
            "- **Opponent:** {}\n",
            p.opponent.as_deref().unwrap_or("N/A")
        ));
        out.push_str(&format!(
            "- **Projection:** {:.1} ({} by {:.1})\n",
            p.projection,
            p.direction().label(),
            p.proj_line_gap().abs()
        ));
        out.push_str(&format!("- **Model Probability:** {:.1}%\n", p.model_prob_pct()));
        out.push_str(&format!("- **Book Probability:** {:.1}%\n", p.book_prob_pct()));
        out.push_str(&format!("- **Expected Value:** {:+.1}¢ per $1\n", p.ev_pct()));
        out.push_str(&format!("- **Odds:** {}\n", format_odds(p.odds)));
        out.push_str(&format!("- **Confidence:** {}\n", confidence.bucket.label()));
        out.push_str(&format!("- **Games Analyzed:** {}\n", p.n_games));
        if let Some(v) = &p.verification {
            out.push_str(&format!(
                "- **Result:** {} {} (actual {})\n",
                v.hit_miss,
                v.result_symbol(),
                v.actual_display()
            ));
        }
        out.push('\n');
    }
    out
}

/// Returns the number of props included in the report.
pub fn export_markdown(
    props: &[PropRecord],
    path: &Path,
    top_n: usize,
    generated_at: NaiveDateTime,
) -> Result<usize, ExportError> {
    std::fs::write(path, render_markdown(props, top_n, generated_at)).map_err(|source| {
        ExportError::Io {
            path: path.to_path_buf(),
            source,
        }
    })?;
    Ok(props.len().min(top_n))
}
