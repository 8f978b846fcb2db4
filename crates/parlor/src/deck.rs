//! A small built-in content set for the bundled binary.
//!
//! Real deployments load their deck into whatever [`Store`](parlor_store::Store)
//! implementation they run; this one exists so `cargo run` produces a
//! playable server out of the box.

use parlor_protocol::CardId;
use parlor_store::{CardRow, QuestionRow};

/// Returns the demo deck: a handful of cards with four answers each.
pub fn demo_deck() -> (Vec<CardRow>, Vec<QuestionRow>) {
    let raw: &[(&str, [&str; 4])] = &[
        (
            "Which of these would they grab first in a house fire?",
            ["The photo albums", "The laptop", "The cat", "The sneaker collection"],
        ),
        (
            "Which of these is their actual morning routine?",
            [
                "Up at six, run, smoothie",
                "Snooze until the last minute",
                "Coffee before speech",
                "Scroll in bed for an hour",
            ],
        ),
        (
            "Which of these would they order at a diner at 3am?",
            ["Pancakes", "A burger with everything", "Just coffee", "Breakfast for four, alone"],
        ),
        (
            "Which of these chores do they secretly enjoy?",
            ["Folding laundry", "Mowing the lawn", "Doing dishes", "None, and they will say so"],
        ),
        (
            "Which of these movies would they watch for the tenth time?",
            ["The comfort rom-com", "The three-hour epic", "The animated one", "The horror classic"],
        ),
        (
            "Which of these would they bring to a desert island?",
            ["A knife", "A solar charger", "A very long book", "Sunscreen, so much sunscreen"],
        ),
    ];

    let mut cards = Vec::new();
    let mut questions = Vec::new();
    for (n, (prompt, answers)) in raw.iter().enumerate() {
        let id = CardId(n as u32 + 1);
        cards.push(CardRow {
            id,
            prompt: (*prompt).to_string(),
        });
        for (i, answer) in answers.iter().enumerate() {
            questions.push(QuestionRow {
                card: id,
                index: i as u32 + 1,
                text: (*answer).to_string(),
            });
        }
    }
    (cards, questions)
}
