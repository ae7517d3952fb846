//! `isVersionEnclosedInFailure`: a version `v` is enclosed when both nearest
//! tested neighbors (left and right) in a selected record's `testedZigVersions`
//! are failures under the requested compatibility regime.

use crate::types::Version;

/// `tested` must be sorted ascending by version and non-empty.
pub fn is_version_enclosed_in_failure(tested: &[(Version, bool)], v: &Version) -> bool {
    assert!(!tested.is_empty(), "testedZigVersions is always non-empty per I5");

    let first = &tested[0];
    if *v <= first.0 {
        return !first.1;
    }
    let last = &tested[tested.len() - 1];
    if *v >= last.0 {
        return !last.1;
    }

    match tested.binary_search_by(|probe| probe.0.cmp(v)) {
        Ok(idx) => !tested[idx].1,
        Err(idx) => {
            // v strictly between tested[0] and tested[last], so idx is in 1..len-1.
            let lo = &tested[idx - 1];
            let hi = &tested[idx];
            !lo.1 && !hi.1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn tested(pairs: &[(&str, bool)]) -> Vec<(Version, bool)> {
        pairs.iter().map(|(s, ok)| (v(s), *ok)).collect()
    }

    #[test]
    fn below_first_uses_first_result() {
        let t = tested(&[("0.12.0", true), ("0.12.5", false)]);
        assert!(!is_version_enclosed_in_failure(&t, &v("0.11.0")));
        let t = tested(&[("0.12.0", false), ("0.12.5", true)]);
        assert!(is_version_enclosed_in_failure(&t, &v("0.11.0")));
    }

    #[test]
    fn above_last_uses_last_result() {
        let t = tested(&[("0.12.0", true), ("0.12.5", false)]);
        assert!(is_version_enclosed_in_failure(&t, &v("0.13.0")));
        let t = tested(&[("0.12.0", true), ("0.12.5", true)]);
        assert!(!is_version_enclosed_in_failure(&t, &v("0.13.0")));
    }

    #[test]
    fn exact_match_uses_that_result() {
        let t = tested(&[("0.12.0", true), ("0.12.5", false), ("0.12.9", true)]);
        assert!(is_version_enclosed_in_failure(&t, &v("0.12.5")));
        assert!(!is_version_enclosed_in_failure(&t, &v("0.12.0")));
    }

    // P6: enclosed iff both the nearest-left and nearest-right tested neighbors failed.
    #[test]
    fn gap_requires_both_neighbors_to_fail() {
        let t = tested(&[("0.12.0", true), ("0.12.5", false), ("0.12.9", false), ("0.12.20", true)]);
        // 0.12.7 is strictly between 0.12.5 (false) and 0.12.9 (false): enclosed.
        assert!(is_version_enclosed_in_failure(&t, &v("0.12.7")));
        // 0.12.2 is strictly between 0.12.0 (true) and 0.12.5 (false): not enclosed.
        assert!(!is_version_enclosed_in_failure(&t, &v("0.12.2")));
    }

    #[test]
    fn mise_from_example_spec_scenario() {
        // from spec.md E3: selected = 0.12.0-dev.2, tested dev.7:Full dev.8:Full
        // dev.9:None dev.11:None (compat=Full). Query dev.9 is an exact match (failure).
        let t = tested(&[
            ("0.12.0-dev.7+aaaaaaaaa", true),
            ("0.12.0-dev.8+aaaaaaaaa", true),
            ("0.12.0-dev.9+aaaaaaaaa", false),
            ("0.12.0-dev.11+aaaaaaaaa", false),
        ]);
        assert!(is_version_enclosed_in_failure(&t, &v("0.12.0-dev.9+aaaaaaaaa")));
    }
}
