//! Myers O(ND) sequence diff.
//!
//! Works over any slice of comparable units and reports runs of
//! equal/inserted/deleted units by length. Common prefix and suffix are
//! stripped first; the middle is split recursively on the middle snake.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    Equal,
    Insert,
    Delete,
}

pub type Edit = (EditKind, usize);

/// Edit script turning `src` into `dst`. Adjacent runs of the same kind
/// are merged and empty runs dropped.
pub fn diff<T: PartialEq>(src: &[T], dst: &[T]) -> Vec<Edit> {
    let mut edits = Vec::new();
    diff_into(src, dst, &mut edits);
    edits
}

fn push(edits: &mut Vec<Edit>, kind: EditKind, len: usize) {
    if len == 0 {
        return;
    }
    match edits.last_mut() {
        Some((last, n)) if *last == kind => *n += len,
        _ => edits.push((kind, len)),
    }
}

fn common_prefix<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

fn common_suffix<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

fn find<T: PartialEq>(haystack: &[T], needle: &[T]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn diff_into<T: PartialEq>(src: &[T], dst: &[T], edits: &mut Vec<Edit>) {
    let prefix = common_prefix(src, dst);
    let suffix = common_suffix(&src[prefix..], &dst[prefix..]);
    push(edits, EditKind::Equal, prefix);
    diff_middle(
        &src[prefix..src.len() - suffix],
        &dst[prefix..dst.len() - suffix],
        edits,
    );
    push(edits, EditKind::Equal, suffix);
}

/// Diff two slices that share no common prefix or suffix.
fn diff_middle<T: PartialEq>(src: &[T], dst: &[T], edits: &mut Vec<Edit>) {
    if src.is_empty() {
        push(edits, EditKind::Insert, dst.len());
        return;
    }
    if dst.is_empty() {
        push(edits, EditKind::Delete, src.len());
        return;
    }

    let src_is_long = src.len() > dst.len();
    let (long, short) = if src_is_long { (src, dst) } else { (dst, src) };
    if let Some(at) = find(long, short) {
        let outer = if src_is_long {
            EditKind::Delete
        } else {
            EditKind::Insert
        };
        push(edits, outer, at);
        push(edits, EditKind::Equal, short.len());
        push(edits, outer, long.len() - at - short.len());
        return;
    }
    if short.len() == 1 {
        push(edits, EditKind::Delete, src.len());
        push(edits, EditKind::Insert, dst.len());
        return;
    }

    bisect(src, dst, edits);
}

fn bisect<T: PartialEq>(src: &[T], dst: &[T], edits: &mut Vec<Edit>) {
    let n1 = src.len() as i64;
    let n2 = dst.len() as i64;
    let max_d = (n1 + n2 + 1) / 2 + 1;
    let v_offset = max_d;
    let v_length = 2 * max_d;
    let mut v1 = vec![-1i64; v_length as usize];
    let mut v2 = vec![-1i64; v_length as usize];
    v1[(v_offset + 1) as usize] = 0;
    v2[(v_offset + 1) as usize] = 0;

    let delta = n1 - n2;
    // With an odd delta the forward path detects the overlap.
    let front = delta % 2 != 0;
    let (mut k1_start, mut k1_end, mut k2_start, mut k2_end) = (0i64, 0i64, 0i64, 0i64);

    for d in 0..max_d {
        let mut k1 = -d + k1_start;
        while k1 <= d - k1_end {
            let k1_offset = (v_offset + k1) as usize;
            let mut x1 = if k1 == -d || (k1 != d && v1[k1_offset - 1] < v1[k1_offset + 1]) {
                v1[k1_offset + 1]
            } else {
                v1[k1_offset - 1] + 1
            };
            let mut y1 = x1 - k1;
            while x1 < n1 && y1 < n2 && src[x1 as usize] == dst[y1 as usize] {
                x1 += 1;
                y1 += 1;
            }
            v1[k1_offset] = x1;
            if x1 > n1 {
                k1_end += 2;
            } else if y1 > n2 {
                k1_start += 2;
            } else if front {
                let k2_offset = v_offset + delta - k1;
                if (0..v_length).contains(&k2_offset) && v2[k2_offset as usize] != -1 {
                    let x2 = n1 - v2[k2_offset as usize];
                    if x1 >= x2 {
                        split(src, dst, x1 as usize, y1 as usize, edits);
                        return;
                    }
                }
            }
            k1 += 2;
        }

        let mut k2 = -d + k2_start;
        while k2 <= d - k2_end {
            let k2_offset = (v_offset + k2) as usize;
            let mut x2 = if k2 == -d || (k2 != d && v2[k2_offset - 1] < v2[k2_offset + 1]) {
                v2[k2_offset + 1]
            } else {
                v2[k2_offset - 1] + 1
            };
            let mut y2 = x2 - k2;
            while x2 < n1
                && y2 < n2
                && src[(n1 - x2 - 1) as usize] == dst[(n2 - y2 - 1) as usize]
            {
                x2 += 1;
                y2 += 1;
            }
            v2[k2_offset] = x2;
            if x2 > n1 {
                k2_end += 2;
            } else if y2 > n2 {
                k2_start += 2;
            } else if !front {
                let k1_offset = v_offset + delta - k2;
                if (0..v_length).contains(&k1_offset) && v1[k1_offset as usize] != -1 {
                    let x1 = v1[k1_offset as usize];
                    let y1 = v_offset + x1 - k1_offset;
                    if x1 >= n1 - x2 {
                        split(src, dst, x1 as usize, y1 as usize, edits);
                        return;
                    }
                }
            }
            k2 += 2;
        }
    }

    push(edits, EditKind::Delete, src.len());
    push(edits, EditKind::Insert, dst.len());
}

fn split<T: PartialEq>(src: &[T], dst: &[T], x: usize, y: usize, edits: &mut Vec<Edit>) {
    diff_into(&src[..x], &dst[..y], edits);
    diff_into(&src[x..], &dst[y..], edits);
}
