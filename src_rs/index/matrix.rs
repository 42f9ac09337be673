// 목적:
// - 네이티브 호출에 넘길 조밀 행 우선 행렬을 표현한다.
//
// 설명:
// - 소유 행렬(Matrix)과 빌린 뷰(MatrixRef) 모두 rows * cols == len을 보장한다.
// - 행/열 수는 네이티브 int 범위 안에 있어야 하며 0이면 거부한다.
//
// 디자인 패턴:
// - 가드 생성자(Guarded Constructor).
//
// 참조:
// - src_rs/index/handle.rs
// - src_rs/index/ops.rs

use std::os::raw::c_int;

use crate::core::errors::{FlannError, FlannResult};

/// 네이티브 int로 표현 가능한 크기인지 검증한다.
pub fn to_c_dim(value: usize, field_name: &str) -> FlannResult<c_int> {
    c_int::try_from(value).map_err(|_| {
        FlannError::InvalidInput(format!(
            "{}가 네이티브 int 범위를 벗어났습니다: {}",
            field_name, value
        ))
    })
}

fn validate_shape(len: usize, rows: usize, cols: usize) -> FlannResult<()> {
    if rows == 0 || cols == 0 {
        return Err(FlannError::InvalidInput(format!(
            "행렬의 행/열 수는 1 이상이어야 합니다: {}x{}",
            rows, cols
        )));
    }

    let expected = rows.checked_mul(cols).ok_or_else(|| {
        FlannError::InvalidInput(format!("행렬 크기가 너무 큽니다: {}x{}", rows, cols))
    })?;

    if expected != len {
        return Err(FlannError::InvalidInput(format!(
            "버퍼 길이가 형상과 맞지 않습니다: {}x{} != {}",
            rows, cols, len
        )));
    }

    to_c_dim(rows, "rows")?;
    to_c_dim(cols, "cols")?;
    Ok(())
}

/// 소유권을 가진 행 우선 행렬.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T: Copy> Matrix<T> {
    pub fn new(data: Vec<T>, rows: usize, cols: usize) -> FlannResult<Self> {
        validate_shape(data.len(), rows, cols)?;
        Ok(Self { data, rows, cols })
    }

    /// 행 목록으로부터 행렬을 만든다. 모든 행의 길이가 같아야 한다.
    pub fn from_rows(rows: &[Vec<T>]) -> FlannResult<Self> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        if let Some(position) = rows.iter().position(|row| row.len() != cols) {
            return Err(FlannError::InvalidInput(format!(
                "{}번째 행의 길이가 다릅니다: {} != {}",
                position,
                rows[position].len(),
                cols
            )));
        }

        let data = rows.iter().flatten().copied().collect::<Vec<_>>();
        Self::new(data, rows.len(), cols)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn row(&self, index: usize) -> Option<&[T]> {
        if index >= self.rows {
            return None;
        }
        let start = index * self.cols;
        Some(&self.data[start..start + self.cols])
    }

    pub fn view(&self) -> MatrixRef<'_, T> {
        MatrixRef {
            data: &self.data,
            rows: self.rows,
            cols: self.cols,
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub(crate) fn as_ptr(&self) -> *const T {
        self.data.as_ptr()
    }
}

/// 빌린 행 우선 행렬 뷰.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatrixRef<'a, T> {
    data: &'a [T],
    rows: usize,
    cols: usize,
}

impl<'a, T: Copy> MatrixRef<'a, T> {
    pub fn new(data: &'a [T], rows: usize, cols: usize) -> FlannResult<Self> {
        validate_shape(data.len(), rows, cols)?;
        Ok(Self { data, rows, cols })
    }

    /// 단일 벡터를 1행 행렬로 본다.
    pub fn single(data: &'a [T]) -> FlannResult<Self> {
        Self::new(data, 1, data.len())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    pub fn to_matrix(&self) -> Matrix<T> {
        Matrix {
            data: self.data.to_vec(),
            rows: self.rows,
            cols: self.cols,
        }
    }

    pub(crate) fn as_ptr(&self) -> *const T {
        self.data.as_ptr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ragged_rows_are_rejected() {
        let error = Matrix::from_rows(&[vec![1.0f32, 2.0], vec![3.0]]).unwrap_err();
        assert!(error.to_string().contains("1번째"));
    }

    #[test]
    fn row_access_respects_bounds() {
        let matrix = Matrix::new(vec![1u8, 2, 3, 4, 5, 6], 3, 2).unwrap();
        assert_eq!(matrix.row(1), Some(&[3u8, 4][..]));
        assert_eq!(matrix.row(3), None);
    }
}
