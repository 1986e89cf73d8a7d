/// Signed distance from `pos` to `seq` on the wrapping counter line. The sign says which one
/// is ahead as long as they are less than `isize::MAX` apart.
#[inline(always)]
pub fn distance(seq: usize, pos: usize) -> isize {
    seq.wrapping_sub(pos) as isize
}
