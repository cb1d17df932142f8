// Copyright @yucwang 2026

use std::fs;
use std::path::Path;

use thiserror::Error;
use wavefront_obj::{obj, ParseError};

use crate::math::constants::Vector3f;
use crate::shapes::triangle::Triangle;

#[derive(Debug, Error)]
pub enum ObjLoadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(ParseError),
    #[error("vertex index {0} out of range")]
    VertexIndex(usize),
}

impl From<ParseError> for ObjLoadError {
    fn from(err: ParseError) -> Self {
        ObjLoadError::Parse(err)
    }
}

pub fn load_obj_from_str<S: AsRef<str>>(input: S) -> Result<obj::ObjSet, ParseError> {
    let triangulated = triangulate_faces(input.as_ref());
    obj::parse(triangulated)
}

pub fn load_triangles_from_str<S: AsRef<str>>(input: S) -> Result<Vec<Triangle>, ObjLoadError> {
    let obj_set = load_obj_from_str(input)?;
    triangles_from_obj_set(&obj_set)
}

pub fn load_triangles_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<Triangle>, ObjLoadError> {
    let data = fs::read_to_string(path)?;
    load_triangles_from_str(data)
}

pub fn triangles_from_obj_set(obj_set: &obj::ObjSet) -> Result<Vec<Triangle>, ObjLoadError> {
    let mut triangles = Vec::new();
    for object in obj_set.objects.iter() {
        let vertex = |idx: usize| {
            object.vertices.get(idx)
                .map(|v| Vector3f::new(v.x, v.y, v.z))
                .ok_or(ObjLoadError::VertexIndex(idx))
        };
        for geom in object.geometry.iter() {
            for shape in geom.shapes.iter() {
                if let obj::Primitive::Triangle(a, b, c) = &shape.primitive {
                    triangles.push(Triangle::new(vertex(a.0)?, vertex(b.0)?, vertex(c.0)?));
                }
            }
        }
    }
    Ok(triangles)
}

// Fan-splits polygon faces, which the parser rejects.
fn triangulate_faces(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + input.len() / 4);
    for line in input.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("f ") || trimmed.starts_with("f\t") {
            let parts: Vec<&str> = trimmed.split_whitespace().collect();
            if parts.len() > 4 {
                let base = parts[1];
                for i in 2..(parts.len() - 1) {
                    out.push_str("f ");
                    out.push_str(base);
                    out.push(' ');
                    out.push_str(parts[i]);
                    out.push(' ');
                    out.push_str(parts[i + 1]);
                    out.push('\n');
                }
                continue;
            }
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}
