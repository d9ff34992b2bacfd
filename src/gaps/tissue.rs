/// Reduce a raw tissue/organ annotation to its parent form.
///
/// Lower-cases, turns `-`/`_` into spaces, collapses whitespace, drops
/// "both sides" annotations, strips a naive plural `s` (not `ss`) from the
/// last word and title-cases each word. Returns `None` when nothing is left.
/// Applying it to its own output is a no-op.
pub fn canonical_tissue(raw: &str) -> Option<String> {
    let s = raw.to_lowercase().replace(['-', '_'], " ");
    let s = strip_both_sides(collapse_whitespace(&s));

    let mut words: Vec<String> = s.split_whitespace().map(str::to_string).collect();
    if let Some(last) = words.last_mut() {
        // A lone "s" is kept as a word.
        if last.len() > 1 && last.ends_with('s') && !last.ends_with("ss") {
            last.pop();
        }
    }

    if words.is_empty() {
        None
    } else {
        Some(words.iter().map(|w| capitalize(w)).collect::<Vec<_>>().join(" "))
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Removes annotations until none remain, since a removal can splice a new
/// one together ("both both sidessides").
fn strip_both_sides(mut s: String) -> String {
    loop {
        let next = if s.contains("glands both sides") {
            s.replacen("glands both sides", "gland", 1)
        } else if s.contains("both sides") {
            s.replacen("both sides", "", 1)
        } else {
            return s;
        };
        s = collapse_whitespace(&next);
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => {
            let mut upper = first.to_uppercase();
            // Keep letters whose upper case is not a single char (e.g. ß).
            let head = match (upper.next(), upper.next()) {
                (Some(u), None) => u,
                _ => first,
            };
            let mut out = String::with_capacity(word.len());
            out.push(head);
            out.push_str(chars.as_str());
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural_and_case_merge() {
        assert_eq!(canonical_tissue("Adrenal Glands").as_deref(), Some("Adrenal Gland"));
        assert_eq!(canonical_tissue("adrenal gland").as_deref(), Some("Adrenal Gland"));
    }

    #[test]
    fn test_both_sides_annotations() {
        assert_eq!(
            canonical_tissue("Adrenal glands- both sides").as_deref(),
            Some("Adrenal Gland")
        );
        assert_eq!(canonical_tissue("Kidney both sides").as_deref(), Some("Kidney"));
    }

    #[test]
    fn test_separators_collapse() {
        assert_eq!(
            canonical_tissue("left_kidney -  cortex").as_deref(),
            Some("Left Kidney Cortex")
        );
    }

    #[test]
    fn test_double_s_kept() {
        assert_eq!(canonical_tissue("Brown adipose tissue mass").as_deref(), Some("Brown Adipose Tissue Mass"));
        assert_eq!(canonical_tissue("Kidneys").as_deref(), Some("Kidney"));
    }

    #[test]
    fn test_empty_results_are_none() {
        assert_eq!(canonical_tissue(""), None);
        assert_eq!(canonical_tissue("both sides"), None);
        assert_eq!(canonical_tissue(" - _ "), None);
    }

    #[test]
    fn test_separator_spelled_both_sides() {
        assert_eq!(canonical_tissue("both_sides Retina").as_deref(), Some("Retina"));
        assert_eq!(canonical_tissue("Kidney both-sides").as_deref(), Some("Kidney"));
        assert_eq!(canonical_tissue("both  sides Liver").as_deref(), Some("Liver"));
        assert_eq!(
            canonical_tissue("Adrenal glands_both_sides").as_deref(),
            Some("Adrenal Gland")
        );
    }

    #[test]
    fn test_lone_s_is_kept() {
        assert_eq!(canonical_tissue("s").as_deref(), Some("S"));
        assert_eq!(canonical_tissue("liver s").as_deref(), Some("Liver S"));
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "Adrenal Glands",
            "adrenal glands- both sides",
            "Soleus",
            "LEFT_KIDNEYS",
            "liver s",
            "a s s",
            "s",
            "Cells",
            "Gastrocnemius muscle",
            "retina - both sides",
            "Thymus",
            "ß-cells",
            "Muscle, Tibialis anterior",
            "both_sides Retina",
            "Kidney both-sides",
            "both  sides Liver",
            "both both sidessides",
            "Adrenal glands_both_sides",
        ];
        for raw in samples {
            let once = canonical_tissue(raw);
            let twice = once.as_deref().and_then(canonical_tissue);
            assert_eq!(once, twice, "not idempotent for {raw:?}");
        }
    }
}
