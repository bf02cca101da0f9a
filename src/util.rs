use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub fn format_score(score: f64) -> String {
    if score == 1.0 {
        "1".to_owned()
    } else {
        let text = format!("{score:.3}");
        text.trim_end_matches('0').trim_end_matches('.').to_owned()
    }
}

pub fn stable_pair(id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_are_printed_without_trailing_zeros() {
        assert_eq!(format_score(1.0), "1");
        assert_eq!(format_score(0.4), "0.4");
        assert_eq!(format_score(0.12345), "0.123");
        assert_eq!(format_score(0.0), "0");
    }

    #[test]
    fn stable_pair_is_deterministic_and_bounded() {
        let (x, y) = stable_pair("NDH07G27970.1");
        assert_eq!((x, y), stable_pair("NDH07G27970.1"));
        assert!((-1.0..=1.0).contains(&x) && (-1.0..=1.0).contains(&y));
    }
}
