//! Seeded game catalog of the simulated storefront.

use serde::{Deserialize, Serialize};

/// A catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    /// URL-safe id
    pub id: String,
    /// Display title
    pub title: String,
    /// Unit price in USD
    pub price: f64,
    /// Genre label
    pub genre: String,
    /// Community rating out of 5
    pub rating: f64,
    /// Store blurb
    #[serde(default)]
    pub description: String,
}

impl Game {
    /// `4.6★`
    #[must_use]
    pub fn rating_label(&self) -> String {
        format!("{:.1}★", self.rating)
    }
}

const SEED: [(&str, &str, f64, &str, f64, &str); 9] = [
    (
        "neon-drift",
        "Neon Drift",
        19.99,
        "Racing",
        4.6,
        "A high-speed synthwave racer with tight drifting, time trials, and neon cityscapes.",
    ),
    (
        "iron-legion",
        "Iron Legion",
        29.99,
        "Action",
        4.4,
        "Build your loadout, upgrade exo-gear, and fight through cinematic missions.",
    ),
    (
        "void-echo",
        "Void Echo",
        24.99,
        "Sci\u{2011}Fi RPG",
        4.7,
        "A story-driven space RPG with branching choices and crew management.",
    ),
    (
        "cryptkeeper",
        "Cryptkeeper",
        14.99,
        "Roguelite",
        4.3,
        "A roguelite dungeon crawler with bite-sized runs and deep builds.",
    ),
    (
        "skyforge-tactics",
        "Skyforge Tactics",
        34.99,
        "Strategy",
        4.2,
        "Turn-based tactical battles above the clouds.",
    ),
    (
        "shadow-circuit",
        "Shadow Circuit",
        21.99,
        "Stealth",
        4.5,
        "Infiltrate megacorp facilities using gadgets, disguises, and silent takedowns.",
    ),
    (
        "astral-odyssey",
        "Astral Odyssey",
        39.99,
        "Open World",
        4.8,
        "A massive open-world adventure across floating islands and ancient ruins.",
    ),
    (
        "pixel-quest",
        "Pixel Quest DX",
        9.99,
        "Indie",
        4.1,
        "A cozy retro platformer with crisp controls and clever secrets.",
    ),
    (
        "mecha-arena",
        "Mecha Arena",
        27.99,
        "Shooter",
        4.0,
        "Fast-paced mech shooter with customizable weapons and smart maps.",
    ),
];

/// The catalog written on first visit
#[must_use]
pub fn seed_catalog() -> Vec<Game> {
    SEED.iter()
        .map(|(id, title, price, genre, rating, description)| Game {
            id: (*id).to_string(),
            title: (*title).to_string(),
            price: *price,
            genre: (*genre).to_string(),
            rating: *rating,
            description: (*description).to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_has_known_prices() {
        let games = seed_catalog();
        assert_eq!(games.len(), 9);
        let price = |id: &str| games.iter().find(|g| g.id == id).map(|g| g.price);
        assert_eq!(price("neon-drift"), Some(19.99));
        assert_eq!(price("iron-legion"), Some(29.99));
    }

    #[test]
    fn test_ids_are_unique() {
        let games = seed_catalog();
        for (i, g) in games.iter().enumerate() {
            assert!(games[i + 1..].iter().all(|o| o.id != g.id));
        }
    }

    #[test]
    fn test_rating_label() {
        assert_eq!(seed_catalog()[0].rating_label(), "4.6★");
    }
}
