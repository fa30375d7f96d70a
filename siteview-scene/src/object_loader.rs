//! Loader for the JSON "Object" scene format
//!
//! A document carries shared `geometries` and `materials` tables plus an `object`
//! tree whose meshes reference table entries by uuid. Node ids are handed out in
//! pre-order starting at zero, so the same document always yields the same ids.

use crate::error::{Result, SceneError};
use crate::material::Material3D;
use crate::mesh::{Mesh3D, Vertex3D, MAX_SPHERE_SEGMENTS};
use crate::object::{NodeId, NodeKind, Object3D};
use crate::primitives::Color;
use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Builds an [`Object3D`] tree from an object-format document
#[derive(Debug, Default)]
pub struct ObjectLoader {
    geometries: HashMap<String, Arc<Mesh3D>>,
    materials: HashMap<String, Arc<Material3D>>,
    next_id: u32,
}

#[derive(Deserialize)]
struct RawDocument {
    #[serde(default)]
    geometries: Vec<RawEntry>,
    #[serde(default)]
    materials: Vec<RawEntry>,
    object: RawObject,
}

#[derive(Deserialize)]
struct RawEntry {
    uuid: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

#[derive(Deserialize)]
struct RawBufferGeometry {
    data: RawBufferData,
}

#[derive(Deserialize)]
struct RawBufferData {
    attributes: HashMap<String, RawAttribute>,
    #[serde(default)]
    index: Option<RawIndex>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAttribute {
    item_size: usize,
    array: Vec<f32>,
}

#[derive(Deserialize)]
struct RawIndex {
    array: Vec<u32>,
}

#[derive(Deserialize)]
struct RawBoxGeometry {
    #[serde(default = "one")]
    width: f32,
    #[serde(default = "one")]
    height: f32,
    #[serde(default = "one")]
    depth: f32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSphereGeometry {
    #[serde(default = "one")]
    radius: f32,
    #[serde(default = "default_width_segments")]
    width_segments: u32,
    #[serde(default = "default_height_segments")]
    height_segments: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMaterial {
    #[serde(default)]
    name: String,
    #[serde(default = "white")]
    color: u32,
    #[serde(default)]
    emissive: u32,
    #[serde(default = "one")]
    emissive_intensity: f32,
    #[serde(default = "one")]
    roughness: f32,
    #[serde(default)]
    metalness: f32,
    #[serde(default = "default_specular")]
    specular: u32,
    #[serde(default = "default_shininess")]
    shininess: f32,
    #[serde(default = "one")]
    opacity: f32,
    #[serde(default)]
    transparent: bool,
    #[serde(default)]
    side: u32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MaterialRef {
    Single(String),
    Multi(Vec<String>),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawObject {
    #[serde(default)]
    uuid: Option<String>,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    matrix: Option<Vec<f32>>,
    #[serde(default)]
    position: Option<[f32; 3]>,
    #[serde(default)]
    quaternion: Option<[f32; 4]>,
    #[serde(default)]
    rotation: Option<Vec<Value>>,
    #[serde(default)]
    scale: Option<[f32; 3]>,
    #[serde(default)]
    geometry: Option<String>,
    #[serde(default)]
    material: Option<MaterialRef>,
    #[serde(default)]
    children: Vec<RawObject>,
    #[serde(default)]
    user_data: Map<String, Value>,
}

fn one() -> f32 {
    1.0
}

fn white() -> u32 {
    0xffffff
}

fn default_specular() -> u32 {
    0x111111
}

fn default_shininess() -> f32 {
    30.0
}

fn default_width_segments() -> u32 {
    32
}

fn default_height_segments() -> u32 {
    16
}

fn check_segments(geometry: &str, attribute: &str, value: u32) -> Result<()> {
    if value > MAX_SPHERE_SEGMENTS {
        return Err(SceneError::InvalidAttribute {
            geometry: geometry.to_string(),
            attribute: attribute.to_string(),
            reason: format!("{value} segments exceeds the limit of {MAX_SPHERE_SEGMENTS}"),
        });
    }
    Ok(())
}

impl ObjectLoader {
    /// Parse a complete document into its root node
    pub fn parse(document: &Value) -> Result<Object3D> {
        if document.get("object").map_or(true, Value::is_null) {
            return Err(SceneError::MissingObject);
        }
        let raw = RawDocument::deserialize(document)?;

        let mut loader = Self::default();
        for entry in raw.geometries {
            loader.parse_geometry(entry)?;
        }
        for entry in raw.materials {
            loader.parse_material(entry)?;
        }
        loader.parse_object(raw.object)
    }

    fn parse_geometry(&mut self, entry: RawEntry) -> Result<()> {
        let fields = Value::Object(entry.fields);
        let mut mesh = match entry.kind.as_str() {
            "BufferGeometry" => {
                let raw = RawBufferGeometry::deserialize(&fields)?;
                buffer_geometry(&entry.uuid, raw.data)?
            }
            "BoxGeometry" => {
                let raw = RawBoxGeometry::deserialize(&fields)?;
                Mesh3D::create_box(raw.width, raw.height, raw.depth)
            }
            "SphereGeometry" => {
                let raw = RawSphereGeometry::deserialize(&fields)?;
                check_segments(&entry.uuid, "widthSegments", raw.width_segments)?;
                check_segments(&entry.uuid, "heightSegments", raw.height_segments)?;
                Mesh3D::create_sphere(raw.radius, raw.width_segments, raw.height_segments)
            }
            other => {
                tracing::warn!(
                    geometry = %entry.uuid,
                    kind = other,
                    "unsupported geometry type, skipping"
                );
                return Ok(());
            }
        };
        if let Some(name) = fields.get("name").and_then(Value::as_str) {
            mesh.name = name.to_string();
        }
        mesh.uuid = Some(entry.uuid.clone());
        self.geometries.insert(entry.uuid, Arc::new(mesh));
        Ok(())
    }

    fn parse_material(&mut self, entry: RawEntry) -> Result<()> {
        let raw = RawMaterial::deserialize(&Value::Object(entry.fields))?;
        let color = Color::from_rgb_u32(raw.color);

        let mut material = match entry.kind.as_str() {
            "MeshStandardMaterial" | "MeshPhysicalMaterial" => {
                Material3D::new_pbr(raw.name, color, raw.metalness, raw.roughness)
                    .with_emissive(Color::from_rgb_u32(raw.emissive), raw.emissive_intensity)
            }
            "MeshBasicMaterial" => Material3D::new_unlit(raw.name, color),
            "MeshPhongMaterial" | "MeshLambertMaterial" => {
                let specular = Color::from_rgb_u32(raw.specular);
                Material3D::new_phong(raw.name, color, specular, raw.shininess)
            }
            other => {
                return Err(SceneError::UnknownMaterialType {
                    uuid: entry.uuid,
                    kind: other.to_string(),
                })
            }
        };
        material.opacity = raw.opacity;
        material.transparent = raw.transparent;
        material.double_sided = raw.side == 2;
        material.uuid = Some(entry.uuid.clone());

        self.materials.insert(entry.uuid, Arc::new(material));
        Ok(())
    }

    fn parse_object(&mut self, raw: RawObject) -> Result<Object3D> {
        let id = NodeId(self.next_id);
        self.next_id += 1;

        let mut node = if raw.kind == "Mesh" {
            let geometry = self.lookup_geometry(raw.geometry.as_deref());
            let material = self.lookup_material(raw.material.as_ref());
            Object3D::new_mesh(id, raw.name.clone(), geometry, material)
        } else {
            let mut group = Object3D::new_group(id, raw.name.clone());
            if !raw.kind.is_empty() {
                group.object_type = raw.kind.clone();
            }
            group
        };
        node.uuid = raw.uuid.clone();
        node.user_data = raw.user_data;

        if let Some(matrix) = &raw.matrix {
            if matrix.len() != 16 {
                return Err(SceneError::InvalidMatrix {
                    object: raw.uuid.unwrap_or(raw.name),
                    len: matrix.len(),
                });
            }
            node.set_matrix(Mat4::from_cols_slice(matrix));
        } else {
            if let Some(position) = raw.position {
                node.position = Vec3::from(position);
            }
            if let Some(quaternion) = raw.quaternion {
                node.rotation = Quat::from_array(quaternion).normalize();
            } else if let Some(rotation) = &raw.rotation {
                let angles: Vec<f32> = rotation
                    .iter()
                    .filter_map(Value::as_f64)
                    .map(|a| a as f32)
                    .collect();
                if let [x, y, z, ..] = angles[..] {
                    node.rotation = Quat::from_euler(EulerRot::XYZ, x, y, z);
                }
            }
            if let Some(scale) = raw.scale {
                node.scale = Vec3::from(scale);
            }
        }

        for child in raw.children {
            let child = self.parse_object(child)?;
            node.add(child);
        }

        if let NodeKind::Mesh { geometry, .. } = &node.kind {
            tracing::trace!(node = %node.id, vertices = geometry.vertices.len(), "parsed mesh");
        }
        Ok(node)
    }

    fn lookup_geometry(&self, uuid: Option<&str>) -> Arc<Mesh3D> {
        match uuid.and_then(|uuid| self.geometries.get(uuid)) {
            Some(geometry) => geometry.clone(),
            None => {
                tracing::warn!(geometry = ?uuid, "undefined geometry, using an empty one");
                Arc::new(Mesh3D::new(String::new()))
            }
        }
    }

    fn lookup_material(&self, reference: Option<&MaterialRef>) -> Arc<Material3D> {
        let uuid = match reference {
            Some(MaterialRef::Single(uuid)) => Some(uuid.as_str()),
            Some(MaterialRef::Multi(uuids)) => uuids.first().map(String::as_str),
            None => None,
        };
        match uuid.and_then(|uuid| self.materials.get(uuid)) {
            Some(material) => material.clone(),
            None => {
                tracing::warn!(material = ?uuid, "undefined material, using the default");
                Arc::new(Material3D::default())
            }
        }
    }
}

fn attribute_error(geometry: &str, attribute: &str, reason: String) -> SceneError {
    SceneError::InvalidAttribute {
        geometry: geometry.to_string(),
        attribute: attribute.to_string(),
        reason,
    }
}

fn read_attribute<'a>(
    geometry: &str,
    attributes: &'a HashMap<String, RawAttribute>,
    name: &str,
    item_size: usize,
    count: Option<usize>,
) -> Result<Option<&'a [f32]>> {
    let Some(attribute) = attributes.get(name) else {
        return Ok(None);
    };
    if attribute.item_size != item_size {
        return Err(attribute_error(
            geometry,
            name,
            format!("expected itemSize {}, got {}", item_size, attribute.item_size),
        ));
    }
    if attribute.array.len() % item_size != 0 {
        return Err(attribute_error(
            geometry,
            name,
            format!("array length {} is not a multiple of {}", attribute.array.len(), item_size),
        ));
    }
    if let Some(count) = count {
        if attribute.array.len() / item_size != count {
            return Err(attribute_error(
                geometry,
                name,
                format!("expected {} items, got {}", count, attribute.array.len() / item_size),
            ));
        }
    }
    Ok(Some(&attribute.array))
}

fn buffer_geometry(uuid: &str, data: RawBufferData) -> Result<Mesh3D> {
    let positions = read_attribute(uuid, &data.attributes, "position", 3, None)?
        .ok_or_else(|| attribute_error(uuid, "position", "missing".to_string()))?;
    let count = positions.len() / 3;
    let normals = read_attribute(uuid, &data.attributes, "normal", 3, Some(count))?;
    let uvs = read_attribute(uuid, &data.attributes, "uv", 2, Some(count))?;

    let mut mesh = Mesh3D::new("BufferGeometry".to_string());
    for i in 0..count {
        let position = Vec3::from_slice(&positions[i * 3..]);
        // Flat up-facing normal when the geometry has none
        let normal = normals.map_or(Vec3::Y, |n| Vec3::from_slice(&n[i * 3..]));
        let tex_coords = uvs.map_or(Vec2::ZERO, |uv| Vec2::from_slice(&uv[i * 2..]));
        mesh.vertices.push(Vertex3D::new(position, normal, tex_coords));
    }

    mesh.indices = match data.index {
        Some(index) => {
            if let Some(bad) = index.array.iter().find(|&&i| i as usize >= count) {
                return Err(attribute_error(
                    uuid,
                    "index",
                    format!("index {} out of range for {} vertices", bad, count),
                ));
            }
            index.array
        }
        // Non-indexed geometry
        None => (0..count as u32).collect(),
    };
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(object: Value) -> Value {
        json!({
            "metadata": { "version": 4.6, "type": "Object", "generator": "Object3D.toJSON" },
            "geometries": [
                { "uuid": "g-box", "type": "BoxGeometry", "width": 2, "height": 4, "depth": 6 },
                {
                    "uuid": "g-tri",
                    "type": "BufferGeometry",
                    "data": {
                        "attributes": {
                            "position": {
                                "itemSize": 3,
                                "type": "Float32Array",
                                "array": [0, 0, 0, 1, 0, 0, 0, 1, 0],
                                "normalized": false
                            }
                        }
                    }
                }
            ],
            "materials": [
                {
                    "uuid": "m-std", "type": "MeshStandardMaterial",
                    "color": 0x336699, "roughness": 0.5, "metalness": 0.1
                },
                {
                    "uuid": "m-basic", "type": "MeshBasicMaterial",
                    "color": 0xff0000, "opacity": 0.5, "transparent": true
                }
            ],
            "object": object
        })
    }

    #[test]
    fn test_parse_tree_with_preorder_ids() {
        let doc = document(json!({
            "uuid": "root",
            "type": "Group",
            "name": "Root",
            "children": [
                {
                    "uuid": "a", "type": "Mesh", "name": "A",
                    "geometry": "g-box", "material": "m-std"
                },
                {
                    "uuid": "b", "type": "Group", "name": "B",
                    "children": [
                        {
                            "uuid": "c", "type": "Mesh",
                            "geometry": "g-tri", "material": ["m-basic", "m-std"]
                        }
                    ]
                }
            ]
        }));

        let root = ObjectLoader::parse(&doc).unwrap();
        let ids: Vec<(u32, &str)> = root.traverse().map(|n| (n.id.0, n.name.as_str())).collect();
        assert_eq!(ids, vec![(0, "Root"), (1, "A"), (2, "B"), (3, "")]);

        let c = root.find(NodeId(3)).unwrap();
        assert!(c.is_renderable());
        let material = c.material().unwrap();
        assert_eq!(material.uuid.as_deref(), Some("m-basic"));
        assert!(material.transparent);
        assert_eq!(material.opacity, 0.5);

        let a = root.find(NodeId(1)).unwrap();
        assert_eq!(a.material().unwrap().color().to_rgb_u32(), 0x336699);
    }

    #[test]
    fn test_shared_geometry_is_shared() {
        let doc = document(json!({
            "type": "Group",
            "children": [
                { "type": "Mesh", "geometry": "g-box", "material": "m-std" },
                { "type": "Mesh", "geometry": "g-box", "material": "m-std" }
            ]
        }));
        let root = ObjectLoader::parse(&doc).unwrap();
        let geometries: Vec<_> = root
            .children
            .iter()
            .map(|child| match &child.kind {
                NodeKind::Mesh { geometry, .. } => geometry.clone(),
                NodeKind::Group => panic!("expected mesh"),
            })
            .collect();
        assert!(Arc::ptr_eq(&geometries[0], &geometries[1]));
    }

    #[test]
    fn test_matrix_transform() {
        let doc = document(json!({
            "type": "Mesh",
            "geometry": "g-box",
            "material": "m-std",
            "matrix": [1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1, 0, 5, 6, 7, 1]
        }));
        let root = ObjectLoader::parse(&doc).unwrap();
        assert_eq!(root.position, Vec3::new(5.0, 6.0, 7.0));

        let bounds = root.bounding_box().unwrap();
        assert_eq!(bounds.center(), Vec3::new(5.0, 6.0, 7.0));
    }

    #[test]
    fn test_missing_object_is_an_error() {
        let doc = json!({ "metadata": {}, "geometries": [], "materials": [] });
        assert!(matches!(ObjectLoader::parse(&doc), Err(SceneError::MissingObject)));
    }

    #[test]
    fn test_unknown_material_type_is_an_error() {
        let doc = json!({
            "geometries": [],
            "materials": [{ "uuid": "m", "type": "ShaderMaterial" }],
            "object": { "type": "Group" }
        });
        assert!(matches!(
            ObjectLoader::parse(&doc),
            Err(SceneError::UnknownMaterialType { kind, .. }) if kind == "ShaderMaterial"
        ));
    }

    #[test]
    fn test_unsupported_geometry_falls_back_to_empty() {
        let doc = json!({
            "geometries": [{ "uuid": "g", "type": "TorusKnotGeometry" }],
            "materials": [],
            "object": { "type": "Mesh", "geometry": "g", "material": "missing" }
        });
        let root = ObjectLoader::parse(&doc).unwrap();
        assert!(root.bounding_box().is_none());
        assert_eq!(root.material().unwrap().name, "Default");
    }

    #[test]
    fn test_bad_index_is_an_error() {
        let doc = json!({
            "geometries": [{
                "uuid": "g",
                "type": "BufferGeometry",
                "data": {
                    "attributes": { "position": { "itemSize": 3, "array": [0, 0, 0] } },
                    "index": { "type": "Uint16Array", "array": [0, 1, 2] }
                }
            }],
            "materials": [],
            "object": { "type": "Mesh", "geometry": "g" }
        });
        assert!(matches!(
            ObjectLoader::parse(&doc),
            Err(SceneError::InvalidAttribute { attribute, .. }) if attribute == "index"
        ));
    }

    #[test]
    fn test_oversized_sphere_is_an_error() {
        let doc = json!({
            "geometries": [{
                "uuid": "g-dome",
                "type": "SphereGeometry",
                "radius": 1,
                "widthSegments": u32::MAX,
                "heightSegments": 8
            }],
            "materials": [],
            "object": { "type": "Mesh", "geometry": "g-dome" }
        });
        assert!(matches!(
            ObjectLoader::parse(&doc),
            Err(SceneError::InvalidAttribute { attribute, .. }) if attribute == "widthSegments"
        ));
    }

    #[test]
    fn test_wrong_shape_is_a_json_error() {
        let doc = json!({ "object": { "type": "Group", "children": "not-a-list" } });
        assert!(matches!(ObjectLoader::parse(&doc), Err(SceneError::Json(_))));
    }
}
