use rand::seq::SliceRandom;

const THINKING_MESSAGES: &[&str] = &[
    "Checking the pantry",
    "Leafing through the recipe box",
    "Simmering",
    "Tasting for seasoning",
    "Sharpening knives",
    "Preheating",
];

pub fn get_random_thinking_message() -> &'static str {
    THINKING_MESSAGES
        .choose(&mut rand::thread_rng())
        .unwrap_or(&THINKING_MESSAGES[0])
}
