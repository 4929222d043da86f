use ndarray as nd;
use num_traits;

//there is currently no gather in ndarray, so row selection by index list is
//implemented by hand
pub trait GatherRows<T: nd::ScalarOperand + num_traits::identities::Zero + Copy> {
    fn gather_rows(&self, indices: &[usize]) -> Self; //perform the equivalent from python of dst=array[indices] where self is the
                                                      // array and indices select along the first axis
}

impl<T: nd::ScalarOperand + num_traits::identities::Zero + Copy> GatherRows<T> for nd::Array2<T> {
    fn gather_rows(&self, indices: &[usize]) -> nd::Array2<T> {
        let mut res = nd::Array2::<T>::zeros((indices.len(), self.ncols()));
        for (i_out, &i_in) in indices.iter().enumerate() {
            res.row_mut(i_out).assign(&self.row(i_in));
        }
        res
    }
}

/// Indices `[0, step, 2*step, ..]` below `len`, e.g. for temporal subsampling.
pub fn stride_indices(len: usize, step: usize) -> Vec<usize> {
    (0..len).step_by(step).collect()
}
