use crate::catalog::Words;

const SEED: &[(&str, &[&str])] = &[
    (
        "animale",
        &["pisica", "caine", "vulpe", "arici", "urs", "balena", "girafa", "caprioara", "papagal", "iepure"],
    ),
    (
        "orase",
        &["bucuresti", "cluj", "iasi", "timisoara", "sibiu", "brasov", "constanta"],
    ),
    (
        "fructe",
        &["mar", "para", "banana", "portocala", "kiwi", "struguri", "piersica"],
    ),
    (
        "tehnologie",
        &["javascript", "typescript", "browser", "server", "retea", "internet", "algoritm"],
    ),
    (
        "random",
        &["hangman", "programare", "romania", "carte", "muzica", "teatru", "soare", "laptop"],
    ),
    ("device", &["telefon", "tableta", "monitor"]),
];

/// Catalog written on first access when no document exists yet.
pub fn seed() -> Words {
    SEED.iter()
        .map(|(category, words)| {
            let words = words.iter().map(|w| w.to_string()).collect();
            (category.to_string(), words)
        })
        .collect()
}
