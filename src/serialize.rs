use ncollide2d::na::{Point3, Vector3};
use serde::Serialize;

#[derive(Serialize)]
#[serde(remote = "Point3<f64>")]
pub struct Point3f64 {
    x: f64,
    y: f64,
    z: f64,
}

#[derive(Serialize)]
#[serde(remote = "Vector3<f64>")]
pub struct Vector3f64 {
    x: f64,
    y: f64,
    z: f64,
}
