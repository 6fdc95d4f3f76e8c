/// Searches an ascending slice for the first entry which is greater than or equal to the test
/// value. When no entry qualifies the last index is returned, so that values slightly past the end
/// (typically floating point overshoot) still resolve to the final entry. Returns 0 for an empty
/// or single element slice.
pub fn first_index_at_or_above(slice: &[f64], test_value: f64) -> usize {
    if slice.len() <= 1 || slice[0] >= test_value {
        return 0;
    }

    let last = slice.len() - 1;
    if slice[last] < test_value {
        return last;
    }

    // Invariant: slice[a] < test_value <= slice[b]
    let mut a = 0;
    let mut b = last;
    while b > a + 1 {
        let check = (a + b) / 2;
        if slice[check] >= test_value {
            b = check;
        } else {
            a = check;
        }
    }
    b
}
