use chrono::NaiveDateTime;

const IMAGE_SLUG_CHARS: usize = 50;
const TASK_SLUG_CHARS: usize = 30;

/// Lowercases `prompt`, drops punctuation, joins words with `_` and keeps
/// at most `max_chars` characters.
pub fn slugify(prompt: &str, max_chars: usize) -> String {
    let mut slug = String::new();
    let mut in_gap = false;

    for c in prompt.to_lowercase().chars() {
        if c.is_whitespace() || c == '-' {
            in_gap = true;
        } else if c.is_alphanumeric() || c == '_' {
            if in_gap {
                slug.push('_');
                in_gap = false;
            }
            slug.push(c);
        }
    }
    if in_gap {
        slug.push('_');
    }

    slug.chars().take(max_chars).collect()
}

pub fn prompt_hash(prompt: &str) -> String {
    let digest = format!("{:x}", md5::compute(prompt.as_bytes()));
    digest[..8].to_string()
}

fn stamped(prompt: &str, max_chars: usize, now: NaiveDateTime) -> String {
    format!(
        "{}_{}_{}",
        slugify(prompt, max_chars),
        now.format("%Y%m%d_%H%M%S"),
        prompt_hash(prompt)
    )
}

/// `<slug>_<timestamp>_<hash>.png`
pub fn image_filename(prompt: &str, now: NaiveDateTime) -> String {
    format!("{}.png", stamped(prompt, IMAGE_SLUG_CHARS, now))
}

/// `<slug>_<timestamp>_<hash>`
pub fn task_folder_name(prompt: &str, now: NaiveDateTime) -> String {
    stamped(prompt, TASK_SLUG_CHARS, now)
}
