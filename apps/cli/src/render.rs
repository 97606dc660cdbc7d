use client_core::{GameSession, Outcome, Phase, SpellingAttempt};
use colored::{ColoredString, Colorize};
use shared::{
    domain::FeedbackMarker,
    protocol::{LeaderboardResponse, SubmitScoreResponse, UserStatsResponse},
};

fn tile(letter: char, marker: FeedbackMarker) -> ColoredString {
    let text = format!(" {letter} ");
    match marker {
        FeedbackMarker::Correct => text.black().on_green().bold(),
        FeedbackMarker::Present => text.black().on_yellow().bold(),
        FeedbackMarker::Absent => text.white().on_bright_black(),
    }
}

pub fn feedback_row(attempt: &SpellingAttempt) -> String {
    attempt
        .guess
        .chars()
        .zip(
            attempt
                .feedback
                .iter()
                .copied()
                .chain(std::iter::repeat(FeedbackMarker::Absent)),
        )
        .map(|(letter, marker)| tile(letter, marker).to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// `H A R _ _` style placeholder line for the guess being typed.
pub fn masked_guess(guess: &str, word_length: usize) -> String {
    guess
        .chars()
        .chain(std::iter::repeat('_'))
        .take(word_length)
        .map(String::from)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn print_round(session: &GameSession) {
    let Some(round) = session.round() else {
        return;
    };
    println!();
    println!("{} {}", "Clue:".bright_cyan().bold(), round.description);
    for (idx, hint) in session.revealed_hints().iter().enumerate() {
        println!("  {} {hint}", format!("Hint {}:", idx + 1).bright_magenta());
    }

    match session.phase() {
        Some(Phase::LengthGuess) => {
            if let Some(feedback) = session.length_feedback() {
                println!("{}", feedback.message.yellow());
            }
            let options = round
                .length_options
                .iter()
                .map(usize::to_string)
                .collect::<Vec<_>>()
                .join(" / ");
            println!("How many letters? {}", options.bright_white().bold());
        }
        Some(Phase::Spelling { word_length }) => {
            for attempt in session.spelling_history() {
                println!("  {}", feedback_row(attempt));
            }
            if !session.last_message().is_empty() {
                println!("{}", session.last_message().yellow());
            }
            println!(
                "  {}   ({word_length} letters, attempt #{})",
                masked_guess(session.current_guess(), word_length),
                session.attempts() + 1
            );
        }
        None => {}
    }
}

pub fn print_outcome(outcome: &Outcome, session: &GameSession) {
    println!();
    if outcome.is_winner {
        println!(
            "{} You spelled {} in {} attempt(s).",
            "Correct!".bright_green().bold(),
            outcome.correct_word.to_uppercase().bright_yellow().bold(),
            session.attempts()
        );
    } else {
        println!(
            "The word was {}.",
            outcome.correct_word.to_uppercase().bright_yellow().bold()
        );
    }
    if !outcome.example_sentence.is_empty() {
        println!("  {}", outcome.example_sentence.italic());
    }
}

pub fn print_score(response: &SubmitScoreResponse) {
    match response.rank {
        Some(rank) => println!(
            "{} {} points, rank #{rank}",
            "Score saved:".bright_green().bold(),
            response.score
        ),
        None => println!(
            "{} {} points",
            "Score saved:".bright_green().bold(),
            response.score
        ),
    }
}

pub fn print_leaderboard(board: &LeaderboardResponse, offset: u32) {
    if board.entries.is_empty() {
        println!("No scores yet.");
        return;
    }
    println!(
        "{}",
        format!(
            "{:>4}  {:<20} {:<16} {:>6} {:>8} {:>5} {:>8}  {}",
            "#", "player", "word", "score", "attempts", "hints", "time", "played"
        )
        .bright_cyan()
        .bold()
    );
    for (idx, entry) in board.entries.iter().enumerate() {
        println!(
            "{:>4}  {:<20} {:<16} {:>6} {:>8} {:>5} {:>7.1}s  {}",
            offset as usize + idx + 1,
            entry.username,
            entry.word,
            entry.score,
            entry.attempts,
            entry.hints_used,
            entry.completion_time,
            entry.timestamp.format("%Y-%m-%d %H:%M")
        );
    }
    println!("{} total entries", board.total_entries);
    if let (Some(rank), Some(best)) = (board.user_rank, board.user_best_score) {
        println!("Your best: {best} points (rank #{rank})");
    }
}

pub fn print_stats(stats: &UserStatsResponse) {
    println!("{}", stats.username.bright_yellow().bold());
    println!("  games played      {}", stats.total_games);
    println!("  words completed   {}", stats.total_words_completed);
    println!("  best score        {}", stats.best_score);
    println!("  average score     {:.1}", stats.average_score);
    println!("  average attempts  {:.1}", stats.average_attempts);
    println!("  average time      {:.1}s", stats.average_completion_time);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masked_guess_pads_with_placeholders() {
        assert_eq!(masked_guess("HAR", 5), "H A R _ _");
        assert_eq!(masked_guess("", 3), "_ _ _");
        assert_eq!(masked_guess("HARBOR", 3), "H A R");
    }

    #[test]
    fn feedback_row_renders_one_tile_per_letter() {
        colored::control::set_override(false);
        let row = feedback_row(&SpellingAttempt {
            guess: "CAT".to_string(),
            feedback: vec![FeedbackMarker::Correct, FeedbackMarker::Absent],
        });
        assert_eq!(row, " C   A   T ");
    }
}
