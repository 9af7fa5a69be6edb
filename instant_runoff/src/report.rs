//! Human-readable rendering of the rounds.

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::config::{Outcome, RoundStats, Winner};

/// `1st`, `2nd`, `3rd`, `4th`, ..., `11th`, `12th`, ..., `21st`.
pub fn ordinal(n: u32) -> String {
    let suffix = if (10..=20).contains(&(n % 100)) {
        "th"
    } else {
        match n % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        }
    };
    format!("{}{}", n, suffix)
}

/// Reads a rank label such as `1st`, `2ND` or `3`. Ranks start at 1.
pub fn parse_ordinal(label: &str) -> Option<u32> {
    let lowered = label.trim().to_ascii_lowercase();
    let digits = lowered.trim_end_matches(|c: char| matches!(c, 's' | 't' | 'n' | 'd' | 'r' | 'h'));
    match digits.parse::<u32>() {
        Ok(n) if n > 0 => Some(n),
        _ => None,
    }
}

fn share(votes: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        votes as f64 * 100.0 / total as f64
    }
}

impl<C: Display> Display for RoundStats<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(f, "{} round results:", ordinal(self.round))?;
        for (name, votes) in self.tally.iter() {
            writeln!(
                f,
                "{}: {} vote{} ({:.2}% of total)",
                name,
                votes,
                if *votes == 1 { "" } else { "s" },
                share(*votes, self.total_votes)
            )?;
        }
        if self.exhausted > 0 {
            writeln!(f, "Exhausted ballots: {}", self.exhausted)?;
        }
        if !self.eliminated.is_empty() {
            let names: Vec<String> = self.eliminated.iter().map(|c| c.to_string()).collect();
            writeln!(f, "Eliminated candidates: {}", names.join(" "))?;
        }
        if let Some(outcome) = &self.outcome {
            writeln!(f, "{}", outcome)?;
        }
        Ok(())
    }
}

impl<C: Display> Display for Outcome<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Outcome::MajorityWin(c) => write!(f, "{} wins with a majority of the votes", c),
            Outcome::SoleSurvivorWin(c) => write!(f, "{} wins as the last candidate standing", c),
            Outcome::Tie => write!(f, "The remaining candidates are tied"),
        }
    }
}

impl<C: Display> Display for Winner<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Winner::Candidate(c) => write!(f, "{}", c),
            Winner::Tie => write!(f, "Tie"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals() {
        let labels: Vec<String> = [1, 2, 3, 4, 10, 11, 12, 13, 20, 21, 22, 101, 111, 112, 123]
            .iter()
            .map(|n| ordinal(*n))
            .collect();
        assert_eq!(
            labels,
            vec![
                "1st", "2nd", "3rd", "4th", "10th", "11th", "12th", "13th", "20th", "21st",
                "22nd", "101st", "111th", "112th", "123rd"
            ]
        );
    }

    #[test]
    fn parsing_ordinals() {
        assert_eq!(parse_ordinal("1st"), Some(1));
        assert_eq!(parse_ordinal(" 2nd "), Some(2));
        assert_eq!(parse_ordinal("3RD"), Some(3));
        assert_eq!(parse_ordinal("12th"), Some(12));
        assert_eq!(parse_ordinal("7"), Some(7));
        assert_eq!(parse_ordinal("0th"), None);
        assert_eq!(parse_ordinal("first"), None);
        assert_eq!(parse_ordinal(""), None);
        for n in 1..50 {
            assert_eq!(parse_ordinal(&ordinal(n)), Some(n));
        }
    }

    #[test]
    fn round_rendering() {
        let stats = RoundStats {
            round: 2,
            tally: vec![("A", 3), ("B", 1), ("C", 0)],
            total_votes: 4,
            exhausted: 1,
            eliminated: vec!["C"],
            outcome: None,
        };
        assert_eq!(
            stats.to_string(),
            "2nd round results:\n\
             A: 3 votes (75.00% of total)\n\
             B: 1 vote (25.00% of total)\n\
             C: 0 votes (0.00% of total)\n\
             Exhausted ballots: 1\n\
             Eliminated candidates: C\n"
        );

        let empty = RoundStats {
            round: 1,
            tally: vec![("A", 0)],
            total_votes: 0,
            exhausted: 0,
            eliminated: vec![],
            outcome: Some(Outcome::SoleSurvivorWin("A")),
        };
        assert_eq!(
            empty.to_string(),
            "1st round results:\nA: 0 votes (0.00% of total)\nA wins as the last candidate standing\n"
        );
        assert_eq!(Winner::Candidate("A").to_string(), "A");
        assert_eq!(Winner::<&str>::Tie.to_string(), "Tie");
    }
}
