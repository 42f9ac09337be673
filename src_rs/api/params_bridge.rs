// 목적:
// - 파라미터 레코드를 Python dict처럼 다룰 수 있는 클래스를 제공한다.
//
// 설명:
// - 번역 대상 필드는 기호 이름(str)으로, 나머지는 int/float로 주고받는다.
// - update는 레코드에 없는 키를 건너뛰고, __setitem__은 KeyError를 던진다.
//
// 디자인 패턴:
// - 파사드(Facade).
//
// 참조:
// - src_rs/params/record.rs

use pyo3::exceptions::{PyKeyError, PyTypeError};
use pyo3::prelude::*;
use pyo3::types::PyDict;
use pyo3::IntoPyObject;

use crate::api::errors::to_py_err;
use crate::params::record::{FlannParameters, ParamValue};

/// Python에 노출되는 파라미터 레코드 클래스다.
#[pyclass(name = "FlannParameters")]
pub struct PyFlannParameters {
    pub(crate) inner: FlannParameters,
}

#[pymethods]
impl PyFlannParameters {
    /// 기본값으로 생성하고 키워드 인자를 덮어쓴다.
    #[new]
    #[pyo3(signature = (**kwargs))]
    pub fn new(kwargs: Option<&Bound<'_, PyDict>>) -> PyResult<Self> {
        let mut inner = FlannParameters::default();
        apply_kwargs(&mut inner, kwargs)?;
        Ok(Self { inner })
    }

    /// JSON 객체 문자열로부터 생성한다.
    #[staticmethod]
    pub fn from_json(json: &str) -> PyResult<Self> {
        let inner = FlannParameters::from_json(json).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    pub fn keys(&self) -> Vec<&'static str> {
        FlannParameters::keys().collect()
    }

    pub fn __getitem__<'py>(&self, py: Python<'py>, key: &str) -> PyResult<Bound<'py, PyAny>> {
        let value = self
            .inner
            .get(key)
            .ok_or_else(|| PyKeyError::new_err(key.to_string()))?;
        param_value_to_py(py, &value)
    }

    pub fn __setitem__(&mut self, key: &str, value: &Bound<'_, PyAny>) -> PyResult<()> {
        let value = py_to_param_value(value)?;
        self.inner.set(key, value).map_err(to_py_err)
    }

    pub fn __contains__(&self, key: &str) -> bool {
        FlannParameters::field_kind(key).is_some()
    }

    pub fn __len__(&self) -> usize {
        FlannParameters::keys().count()
    }

    #[pyo3(signature = (**kwargs))]
    pub fn update(&mut self, kwargs: Option<&Bound<'_, PyDict>>) -> PyResult<()> {
        apply_kwargs(&mut self.inner, kwargs)
    }

    pub fn to_dict<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        params_to_dict(py, &self.inner)
    }

    pub fn to_json(&self) -> PyResult<String> {
        self.inner.to_json().map_err(to_py_err)
    }

    pub fn __repr__(&self) -> PyResult<String> {
        Ok(format!("FlannParameters({})", self.to_json()?))
    }
}

/// 키워드 인자를 레코드에 적용한다. 레코드에 없는 키는 건너뛴다.
pub fn apply_kwargs(params: &mut FlannParameters, kwargs: Option<&Bound<'_, PyDict>>) -> PyResult<()> {
    let Some(kwargs) = kwargs else {
        return Ok(());
    };

    let mut entries = Vec::with_capacity(kwargs.len());
    for (key, value) in kwargs.iter() {
        let key = key
            .extract::<String>()
            .map_err(|_| PyTypeError::new_err("파라미터 이름은 문자열이어야 합니다"))?;
        if FlannParameters::field_kind(&key).is_none() {
            continue;
        }
        entries.push((key, py_to_param_value(&value)?));
    }

    params.update(entries).map_err(to_py_err)
}

pub fn params_to_dict<'py>(py: Python<'py>, params: &FlannParameters) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    for (key, value) in params.entries() {
        dict.set_item(key, param_value_to_py(py, &value)?)?;
    }
    Ok(dict)
}

pub fn param_value_to_py<'py>(py: Python<'py>, value: &ParamValue) -> PyResult<Bound<'py, PyAny>> {
    let object = match value {
        ParamValue::Bool(flag) => (*flag).into_pyobject(py)?.to_owned().into_any(),
        ParamValue::Int(int) => (*int).into_pyobject(py)?.into_any(),
        ParamValue::Float(float) => (*float).into_pyobject(py)?.into_any(),
        ParamValue::Text(text) => text.as_str().into_pyobject(py)?.into_any(),
    };
    Ok(object)
}

pub fn py_to_param_value(value: &Bound<'_, PyAny>) -> PyResult<ParamValue> {
    if let Ok(text) = value.extract::<String>() {
        return Ok(ParamValue::Text(text));
    }
    if let Ok(int) = value.extract::<i64>() {
        return Ok(ParamValue::Int(int));
    }
    if let Ok(float) = value.extract::<f64>() {
        return Ok(ParamValue::Float(float));
    }
    Err(PyTypeError::new_err(
        "파라미터 값은 str, int, float 중 하나여야 합니다",
    ))
}
