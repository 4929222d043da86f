use nalgebra as na;
use ndarray as nd;

pub type Vector3f = na::Vector3<f32>;
pub type Matrix3f = na::Matrix3<f32>;

/// Read one length-3 row of an ndarray view as a nalgebra vector.
pub fn row_to_vector3(row: nd::ArrayView1<f32>) -> Vector3f {
    Vector3f::new(row[0], row[1], row[2])
}

pub fn vector3_to_row(v: &Vector3f, mut row: nd::ArrayViewMut1<f32>) {
    row[0] = v.x;
    row[1] = v.y;
    row[2] = v.z;
}

/// Copy a 3x3 nalgebra matrix into a mutable `[3, 3]` ndarray view.
pub fn matrix3_to_view(m: &Matrix3f, mut out: nd::ArrayViewMut2<f32>) {
    for i in 0..3 {
        for j in 0..3 {
            out[(i, j)] = m[(i, j)];
        }
    }
}

pub fn view_to_matrix3(view: nd::ArrayView2<f32>) -> Matrix3f {
    Matrix3f::new(
        view[(0, 0)],
        view[(0, 1)],
        view[(0, 2)],
        view[(1, 0)],
        view[(1, 1)],
        view[(1, 2)],
        view[(2, 0)],
        view[(2, 1)],
        view[(2, 2)],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn matrix3_round_trip() {
        let m = Matrix3f::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0);
        let mut arr = nd::Array2::<f32>::zeros((3, 3));
        matrix3_to_view(&m, arr.view_mut());
        let back = view_to_matrix3(arr.view());
        assert_abs_diff_eq!(m, back, epsilon = 0.0);
    }

    #[test]
    fn row_vector_round_trip() {
        let a = array![1.0_f32, -2.0, 0.5];
        let v = row_to_vector3(a.view());
        let mut out = nd::Array1::<f32>::zeros(3);
        vector3_to_row(&v, out.view_mut());
        assert_eq!(a, out);
    }
}
