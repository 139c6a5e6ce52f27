//! Audit gate checklist.

use std::collections::BTreeMap;

/// Ordered gate checklist: key and label.
pub const GATE_ITEMS: [(&str, &str); 7] = [
    ("klartext", "Clear, understandable finding"),
    ("belege", "At least 2 solid pieces of evidence"),
    ("struktur", "Clean structure and file names"),
    ("prio", "P0/P1/P2 traceable"),
    ("mobil", "Mobile-first checked"),
    ("intern", "Internal only, no real engagement"),
    ("exec", "Short summary for day X possible"),
];

pub fn is_gate_key(key: &str) -> bool {
    GATE_ITEMS.iter().any(|(k, _)| *k == key)
}

/// Percentage of checklist items set, rounded half away from zero.
///
/// Keys outside the checklist are ignored.
pub fn calc_gate_score(gate: &BTreeMap<String, bool>) -> u8 {
    let ok = GATE_ITEMS
        .iter()
        .filter(|(key, _)| gate.get(*key).copied().unwrap_or(false))
        .count();
    ((100 * ok) as f64 / GATE_ITEMS.len() as f64).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate(keys: &[&str]) -> BTreeMap<String, bool> {
        keys.iter().map(|k| (k.to_string(), true)).collect()
    }

    #[test]
    fn partial_and_full_scores() {
        assert_eq!(calc_gate_score(&gate(&["klartext", "belege", "struktur"])), 43);
        let all: Vec<&str> = GATE_ITEMS.iter().map(|(k, _)| *k).collect();
        assert_eq!(calc_gate_score(&gate(&all)), 100);
        assert_eq!(calc_gate_score(&BTreeMap::new()), 0);
    }

    #[test]
    fn rounding_not_truncation() {
        // 1/7 = 14.28, 4/7 = 57.14, 5/7 = 71.43, 6/7 = 85.71
        assert_eq!(calc_gate_score(&gate(&["exec"])), 14);
        assert_eq!(calc_gate_score(&gate(&["klartext", "belege", "struktur", "prio"])), 57);
        assert_eq!(
            calc_gate_score(&gate(&["klartext", "belege", "struktur", "prio", "mobil", "intern"])),
            86
        );
    }

    #[test]
    fn false_and_unknown_keys_do_not_count() {
        let mut g = gate(&["klartext", "bogus"]);
        g.insert("belege".into(), false);
        assert_eq!(calc_gate_score(&g), 14);
        assert!(is_gate_key("mobil"));
        assert!(!is_gate_key("bogus"));
    }
}
