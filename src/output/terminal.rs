// Colored terminal output for analysis reports.
//
// Topic word weights are drawn as percentage bars in place of charts.
// main.rs delegates all report printing here.

use colored::Colorize;

use crate::documents::metadata::year_label;
use crate::metrics::TopPaperEntry;
use crate::pipeline::AnalysisReport;

const BAR_WIDTH: usize = 24;

/// Print a full analysis report.
pub fn display_report(report: &AnalysisReport) {
    println!(
        "\n{}",
        format!(
            "=== Topic Analysis ({} documents, {}) ===",
            report.num_pdfs, report.time_period
        )
        .bold()
    );
    println!("  {}", report.summary_text().dimmed());
    println!(
        "  Model loss: {:.2}  Perplexity: {:.2}",
        report.model_loss, report.perplexity
    );
    if report.skipped_documents > 0 {
        println!(
            "  {} {} PDFs yielded no text and were skipped",
            "!".yellow(),
            report.skipped_documents
        );
    }

    for (idx, topic) in report.topics.iter().enumerate() {
        let lift = report.average_lift_per_topic.get(idx).copied().unwrap_or(0.0);
        println!(
            "\n  {}  {}",
            topic.label.bold().cyan(),
            format!("(avg lift {lift:.2})").dimmed()
        );

        for (word, pct) in topic
            .top_words
            .iter()
            .zip(&topic.word_scores.percentages)
        {
            println!("    {:<20} {} {:>6.2}%", word, bar(*pct).blue(), pct);
        }

        if let Some(papers) = report.top_papers.get(&idx) {
            display_top_papers(papers);
        }
    }

    if let Some(decades) = &report.decade_distribution {
        println!("\n{}", "=== Topic Distribution Over Decades ===".bold());
        let header: Vec<String> = (1..=report.num_topics).map(|k| format!("T{k:<5}")).collect();
        println!("  {:<12} {}", "Decade".dimmed(), header.join(" ").dimmed());
        for (label, mean) in decades {
            let cells: Vec<String> = mean.iter().map(|v| format!("{v:<6.3}")).collect();
            println!("  {:<12} {}", label, cells.join(" "));
        }
    }
    println!();
}

fn display_top_papers(papers: &[TopPaperEntry]) {
    if papers.is_empty() {
        return;
    }
    println!("    {}", "Top papers:".dimmed());
    for (rank, paper) in papers.iter().enumerate() {
        let title = paper.title.as_deref().unwrap_or("Unknown");
        let author = paper.author.as_deref().unwrap_or("Unknown");
        let year = year_label(paper.year);
        let pmid = paper
            .pubmed_id
            .as_deref()
            .map(|id| format!("  PMID {id}"))
            .unwrap_or_default();

        println!(
            "    {}. {} ({}, {})  {}{}",
            rank + 1,
            super::truncate_chars(title, 60),
            author,
            year,
            colorize_loading(paper.loading_factor),
            pmid.dimmed()
        );
    }
}

/// A bar of `BAR_WIDTH` cells filled in proportion to `pct` (0-100).
fn bar(pct: f64) -> String {
    let filled = ((pct / 100.0) * BAR_WIDTH as f64).round().clamp(0.0, BAR_WIDTH as f64) as usize;
    format!("{}{}", "█".repeat(filled), "·".repeat(BAR_WIDTH - filled))
}

fn colorize_loading(loading: f64) -> colored::ColoredString {
    let text = format!("loading {loading:.2}");
    if loading >= 0.75 {
        text.green().bold()
    } else if loading >= 0.25 {
        text.yellow()
    } else {
        text.dimmed()
    }
}
