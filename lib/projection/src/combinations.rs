//! Order-preserving subset enumeration

/// All `k`-element subsets of `items`, in lexicographic index order
///
/// Each subset keeps the relative order of `items`.
pub fn choose_k<T: Clone>(items: &[T], k: usize) -> Vec<Vec<T>> {
    if k > items.len() {
        return Vec::new();
    }

    let mut out = Vec::new();
    let mut idx: Vec<usize> = (0..k).collect();

    loop {
        out.push(idx.iter().map(|&i| items[i].clone()).collect());

        // Rightmost position that can still advance
        let Some(pos) = (0..k).rev().find(|&p| idx[p] < items.len() - k + p) else {
            return out;
        };
        idx[pos] += 1;
        for p in pos + 1..k {
            idx[p] = idx[p - 1] + 1;
        }
    }
}

/// All subsets with at most `k` elements, smallest first
///
/// The empty subset always comes first.
pub fn choose_k_or_less<T: Clone>(items: &[T], k: usize) -> Vec<Vec<T>> {
    (0..=k.min(items.len()))
        .flat_map(|size| choose_k(items, size))
        .collect()
}
