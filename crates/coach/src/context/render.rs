use std::fmt::Write;

use super::labels::{public_label, redact_codenames};
use crate::store::documents::{CupFixture, DailyPrediction, Odds, Probabilities, RoundFixture};

// Writing into a String cannot fail, so the fmt::Result of writeln! is ignored throughout.

pub fn render_daily(doc: &DailyPrediction) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Match: {} vs {} ({})", doc.home, doc.away, doc.competition);
    write_date(&mut out, &doc.date.to_string(), doc.kickoff.as_deref());
    if let Some(odds) = &doc.odds {
        write_odds(&mut out, odds, &doc.home, &doc.away);
    }
    if let Some(probabilities) = &doc.probabilities {
        write_probabilities(&mut out, probabilities);
    }
    if !doc.signals.is_empty() {
        let _ = writeln!(out, "Signals:");
        let mut signals: Vec<_> = doc.signals.iter().collect();
        signals.sort_by(|a, b| (b.score * b.weight).abs().total_cmp(&(a.score * a.weight).abs()));
        for signal in signals {
            let _ = writeln!(
                out,
                "- {}: {:+.2} (weight {:.1}, {})",
                public_label(&signal.code),
                signal.score,
                signal.weight,
                lean(signal.score)
            );
        }
    }
    if let Some(pick) = &doc.pick {
        match doc.confidence {
            Some(confidence) => {
                let _ = writeln!(out, "Pick: {} (confidence {:.0}%)", pick, confidence);
            }
            None => {
                let _ = writeln!(out, "Pick: {}", pick);
            }
        }
    }
    write_comment(&mut out, doc.comment.as_deref());
    out.trim_end().to_string()
}

pub fn render_round(doc: &RoundFixture) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Match: {} vs {} ({}, round {})",
        doc.home, doc.away, doc.competition, doc.round
    );
    write_date(&mut out, &doc.date.to_string(), None);
    if let Some(score) = &doc.score {
        let _ = writeln!(out, "Result: {}", score);
    }
    if let Some(odds) = &doc.odds {
        write_odds(&mut out, odds, &doc.home, &doc.away);
    }
    for (team, form) in [(&doc.home, &doc.home_form), (&doc.away, &doc.away_form)] {
        if let Some(form) = form {
            match describe_streak(form) {
                Some(streak) => {
                    let _ = writeln!(out, "Form {}: {} ({})", team, form, streak);
                }
                None => {
                    let _ = writeln!(out, "Form {}: {}", team, form);
                }
            }
        }
    }
    if let (Some(home), Some(away)) = (doc.home_goals_avg, doc.away_goals_avg) {
        let _ = writeln!(
            out,
            "Goals per game: {} {:.2} | {} {:.2}",
            doc.home, home, doc.away, away
        );
    }
    if let Some(rate) = doc.over_2_5_rate {
        let _ = writeln!(out, "Over 2.5 goals rate: {:.0}%", rate);
    }
    if let Some(rate) = doc.btts_rate {
        let _ = writeln!(out, "Both teams scored rate: {:.0}%", rate);
    }
    if let Some(h2h) = &doc.head_to_head {
        let _ = writeln!(out, "Head-to-head: {}", redact_codenames(h2h));
    }
    write_comment(&mut out, doc.comment.as_deref());
    out.trim_end().to_string()
}

pub fn render_cup(doc: &CupFixture) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Match: {} vs {} ({}, {})",
        doc.home, doc.away, doc.competition, doc.stage
    );
    write_date(&mut out, &doc.date.to_string(), doc.kickoff.as_deref());
    if let Some(odds) = &doc.odds {
        write_odds(&mut out, odds, &doc.home, &doc.away);
    }
    if let Some(prediction) = &doc.prediction {
        let _ = writeln!(out, "Prediction: {}", redact_codenames(prediction));
    }
    write_comment(&mut out, doc.comment.as_deref());
    out.trim_end().to_string()
}

fn write_date(out: &mut String, date: &str, kickoff: Option<&str>) {
    match kickoff {
        Some(time) => {
            let _ = writeln!(out, "Date: {} {}", date, time);
        }
        None => {
            let _ = writeln!(out, "Date: {}", date);
        }
    }
}

fn write_odds(out: &mut String, odds: &Odds, home: &str, away: &str) {
    let _ = writeln!(
        out,
        "Odds: 1 {:.2} | X {:.2} | 2 {:.2}",
        odds.home, odds.draw, odds.away
    );
    let favourite = if odds.home < odds.away && odds.home < odds.draw {
        Some(home)
    } else if odds.away < odds.home && odds.away < odds.draw {
        Some(away)
    } else {
        None
    };
    match favourite {
        Some(team) => {
            let _ = writeln!(out, "Bookmaker favourite: {}", team);
        }
        None => {
            let _ = writeln!(out, "Bookmaker favourite: none, balanced market");
        }
    }
}

fn write_probabilities(out: &mut String, p: &Probabilities) {
    let _ = writeln!(
        out,
        "Probabilities: home {:.0}% | draw {:.0}% | away {:.0}%",
        p.home, p.draw, p.away
    );
}

fn write_comment(out: &mut String, comment: Option<&str>) {
    if let Some(comment) = comment.map(str::trim).filter(|c| !c.is_empty()) {
        let _ = writeln!(out, "Comment: {}", redact_codenames(comment));
    }
}

fn lean(score: f64) -> &'static str {
    if score >= 0.5 {
        "strongly favours home"
    } else if score > 0.1 {
        "favours home"
    } else if score <= -0.5 {
        "strongly favours away"
    } else if score < -0.1 {
        "favours away"
    } else {
        "neutral"
    }
}

/// Describe the current run of a form string written oldest to newest ("WWDLW").
pub fn describe_streak(form: &str) -> Option<String> {
    let results: Vec<char> = form
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .map(|c| c.to_ascii_uppercase())
        .collect();
    let last = *results.last()?;
    let run = results.iter().rev().take_while(|c| **c == last).count();
    let word = match (last, run) {
        ('W', 1) => "win",
        ('W', _) => "wins",
        ('D', 1) => "draw",
        ('D', _) => "draws",
        ('L', 1) => "defeat",
        ('L', _) => "defeats",
        _ => return None,
    };
    if run == 1 {
        Some(format!("last match: {}", word))
    } else {
        Some(format!("{} {} in a row", run, word))
    }
}
