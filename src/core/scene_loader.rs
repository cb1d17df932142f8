// Copyright @yucwang 2026

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use log::info;
use quick_xml::events::attributes::Attributes;
use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

use crate::core::error::GeometryError;
use crate::core::face::FaceDirection;
use crate::core::geometry::{ GeometryBuilder, GeometryGraph };
use crate::core::material::{ LambertianFit, Material, MaterialLibrary, ReflectorModel, Scintillation, SpecularLobeTable };
use crate::core::volume::VolumeKind;
use crate::io::history_writer::RecordMode;
use crate::io::obj_utils::ObjLoadError;
use crate::math::constants::{ Float, Vector3f, UM_PER_MM };
use crate::sources::deposit::EnergyDeposit;
use crate::sources::isotropic::IsotropicPointSource;
use crate::sources::PhotonSource;
use crate::surfaces::height_field::HeightField;
use crate::surfaces::patch::SurfacePatch;

#[derive(Debug, Error)]
pub enum AssemblyLoadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("missing field: {0}")]
    MissingField(&'static str),
    #[error("unknown material '{0}'")]
    UnknownMaterial(String),
    #[error("patch error: {0}")]
    Obj(#[from] ObjLoadError),
    #[error("geometry error: {0}")]
    Geometry(#[from] GeometryError),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackingSettings {
    pub seed: Option<u64>,
    pub threads: Option<usize>,
    pub record: Option<RecordMode>,
}

pub struct Assembly {
    pub geometry: GeometryGraph,
    pub materials: MaterialLibrary,
    pub sources: Vec<Box<dyn PhotonSource>>,
    pub tracking: TrackingSettings,
}

pub fn load_assembly<P: AsRef<Path>>(path: P) -> Result<Assembly, AssemblyLoadError> {
    let path = path.as_ref();
    let xml = fs::read_to_string(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    info!("Loading assembly {}", path.display());
    parse_assembly(&xml, base_dir)
}

enum SourceKind {
    Isotropic { count: usize },
    Deposit { energy: Float },
}

struct SourceSpec {
    kind: SourceKind,
    material: String,
    volume: String,
    position: Vector3f,
}

pub fn parse_assembly(xml: &str, base_dir: &Path) -> Result<Assembly, AssemblyLoadError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();

    let mut defaults: HashMap<String, String> = HashMap::new();
    let builtin = MaterialLibrary::builtin();
    let mut materials = MaterialLibrary::new();
    let mut builder = GeometryBuilder::new();
    let mut lenient = false;
    let mut current_volume: Option<String> = None;
    let mut source_specs: Vec<SourceSpec> = Vec::new();
    let mut tracking = TrackingSettings::default();

    loop {
        buf.clear();
        let (element, is_start) = match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => (e, true),
            Ok(Event::Empty(e)) => (e, false),
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"volume" {
                    current_volume = None;
                }
                continue;
            }
            Err(e) => return Err(AssemblyLoadError::Parse(e.to_string())),
            _ => continue,
        };

        let attrs = collect_attributes(element.attributes(), &defaults)?;
        match element.name().as_ref() {
            b"assembly" => {
                if let Some(value) = attrs.get("lenient") {
                    lenient = parse_bool(value)?;
                }
            }
            b"default" => {
                if let (Some(k), Some(v)) = (attrs.get("name"), attrs.get("value")) {
                    defaults.insert(k.clone(), v.clone());
                }
            }
            b"material" => {
                let material = parse_material(&attrs, &builtin)?;
                materials.insert(material);
            }
            b"volume" => {
                let name = required(&attrs, "name", "volume.name")?;
                let kind_name = required(&attrs, "kind", "volume.kind")?;
                let kind = VolumeKind::from_name(kind_name)
                    .ok_or_else(|| AssemblyLoadError::Parse(format!("unknown volume kind: {}", kind_name)))?;
                let material_name = required(&attrs, "material", "volume.material")?;
                let material = materials.get(material_name)
                    .ok_or_else(|| AssemblyLoadError::UnknownMaterial(material_name.to_string()))?;
                let center = parse_vec3(required(&attrs, "center", "volume.center")?)?;
                let size = parse_vec3(required(&attrs, "size", "volume.size")?)?;
                builder.add_volume(name, kind, material, center, size)?;
                if is_start {
                    current_volume = Some(name.to_string());
                }
            }
            b"patch" => {
                let volume = current_volume.as_ref().ok_or(AssemblyLoadError::MissingField("patch.volume"))?;
                let face_label = required(&attrs, "face", "patch.face")?;
                let face = FaceDirection::from_label(face_label)
                    .ok_or_else(|| AssemblyLoadError::Parse(format!("invalid face: {}", face_label)))?;
                let patch = parse_patch(&attrs, face, base_dir)?;
                info!("Patch on {} {}: {} triangles", volume, face, patch.triangle_count());
                builder.add_patch(volume, face, Arc::new(patch))?;
            }
            b"source" => {
                let kind = match required(&attrs, "type", "source.type")? {
                    "isotropic" => SourceKind::Isotropic { count: parse_usize(required(&attrs, "count", "source.count")?)? },
                    "deposit" => SourceKind::Deposit { energy: parse_float(required(&attrs, "energy", "source.energy")?)? },
                    other => return Err(AssemblyLoadError::Parse(format!("unsupported source: {}", other))),
                };
                source_specs.push(SourceSpec {
                    kind,
                    material: required(&attrs, "material", "source.material")?.to_string(),
                    volume: required(&attrs, "volume", "source.volume")?.to_string(),
                    position: parse_vec3(required(&attrs, "position", "source.position")?)? * UM_PER_MM,
                });
            }
            b"tracking" => {
                if let Some(value) = attrs.get("seed") {
                    tracking.seed = Some(parse_u64(value)?);
                }
                if let Some(value) = attrs.get("threads") {
                    tracking.threads = Some(parse_usize(value)?);
                }
                if let Some(value) = attrs.get("record") {
                    tracking.record = Some(RecordMode::from_name(value)
                        .ok_or_else(|| AssemblyLoadError::Parse(format!("invalid record mode: {}", value)))?);
                }
            }
            _ => {}
        }
    }

    let geometry = builder.lenient(lenient).build()?;

    let mut sources: Vec<Box<dyn PhotonSource>> = Vec::with_capacity(source_specs.len());
    for spec in source_specs {
        let material = materials.get(&spec.material)
            .ok_or_else(|| AssemblyLoadError::UnknownMaterial(spec.material.clone()))?;
        let volume = geometry.id(&spec.volume)
            .ok_or_else(|| GeometryError::UnknownVolume(spec.volume.clone()))?;
        let source: Box<dyn PhotonSource> = match spec.kind {
            SourceKind::Isotropic { count } => Box::new(IsotropicPointSource::new(spec.position, volume, material, count)),
            SourceKind::Deposit { energy } => Box::new(EnergyDeposit::new(spec.position, volume, material, energy)),
        };
        info!("Source: {}", source.describe());
        sources.push(source);
    }

    info!("Loaded {} volumes, {} materials, {} sources.", geometry.len(), materials.names().len(), sources.len());
    Ok(Assembly { geometry, materials, sources, tracking })
}

fn collect_attributes(attributes: Attributes,
                      defaults: &HashMap<String, String>) -> Result<HashMap<String, String>, AssemblyLoadError> {
    let mut out = HashMap::new();
    for attr in attributes {
        let attr = attr.map_err(|e| AssemblyLoadError::Parse(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr.unescape_value().map_err(|e| AssemblyLoadError::Parse(e.to_string()))?;
        out.insert(key, resolve_value(&value, defaults));
    }
    Ok(out)
}

fn parse_material(attrs: &HashMap<String, String>, builtin: &MaterialLibrary) -> Result<Material, AssemblyLoadError> {
    let name = required(attrs, "name", "material.name")?;
    if attrs.get("builtin").map(|v| parse_bool(v)).transpose()?.unwrap_or(false) {
        return builtin.get(name)
            .map(|m| (*m).clone())
            .ok_or_else(|| AssemblyLoadError::UnknownMaterial(name.to_string()));
    }

    let refractive_index = parse_float(required(attrs, "refractive_index", "material.refractive_index")?)?;
    let attenuation_length = parse_float(required(attrs, "attenuation_length", "material.attenuation_length")?)?;
    let mut material = Material::new(name, refractive_index, attenuation_length);

    if let Some(reflectivity) = attrs.get("reflectivity") {
        let fit = parse_list(required(attrs, "lambertian_fit", "material.lambertian_fit")?)?;
        if fit.len() != 4 {
            return Err(AssemblyLoadError::Parse(format!("lambertian_fit needs 4 values, got {}", fit.len())));
        }
        let angles = parse_list(required(attrs, "lobe_angles", "material.lobe_angles")?)?;
        let sigmas = parse_list(required(attrs, "lobe_sigmas", "material.lobe_sigmas")?)?;
        let lobe = SpecularLobeTable::new(&angles, &sigmas)
            .ok_or_else(|| AssemblyLoadError::Parse(format!("invalid lobe table for {}", name)))?;
        material = material.with_reflector(ReflectorModel {
            reflectivity: parse_float(reflectivity)?,
            lambertian: LambertianFit { a1: fit[0], b1: fit[1], a2: fit[2], b2: fit[3] },
            lobe,
        });
    }

    if let Some(light_yield) = attrs.get("light_yield") {
        let rise = parse_float(required(attrs, "rise_time", "material.rise_time")?)?;
        let fall = parse_float(required(attrs, "fall_time", "material.fall_time")?)?;
        let wavelengths = parse_list(required(attrs, "emission_wavelengths", "material.emission_wavelengths")?)?;
        let amplitudes = parse_list(required(attrs, "emission_amplitudes", "material.emission_amplitudes")?)?;
        let scintillation = Scintillation::new(parse_float(light_yield)?, rise, fall, wavelengths, &amplitudes)
            .ok_or_else(|| AssemblyLoadError::Parse(format!("invalid scintillation for {}", name)))?;
        material = material.with_scintillation(scintillation);
    }

    Ok(material)
}

fn parse_patch(attrs: &HashMap<String, String>,
               face: FaceDirection,
               base_dir: &Path) -> Result<SurfacePatch, AssemblyLoadError> {
    let patch = if let Some(file) = attrs.get("file") {
        SurfacePatch::from_obj(face, base_dir.join(file))?
    } else {
        let extent = parse_float(required(attrs, "extent", "patch.extent")?)?;
        let field = match required(attrs, "generator", "patch.generator")? {
            "flat" => {
                let cells = attrs.get("cells").map(|v| parse_usize(v)).transpose()?.unwrap_or(1);
                HeightField::flat(extent, cells)
            }
            "grooves" => {
                let pitch = parse_float(required(attrs, "pitch", "patch.pitch")?)?;
                let depth = parse_float(required(attrs, "depth", "patch.depth")?)?;
                let samples = attrs.get("samples").map(|v| parse_usize(v)).transpose()?.unwrap_or(4);
                HeightField::v_grooves(extent, pitch, depth, samples)
            }
            other => return Err(AssemblyLoadError::Parse(format!("unsupported patch generator: {}", other))),
        };
        SurfacePatch::from_height_field(face, &field)
    };
    patch.ok_or_else(|| AssemblyLoadError::Parse(format!("patch on face {} has no usable triangles", face)))
}

fn required<'m>(attrs: &'m HashMap<String, String>,
                key: &str,
                field: &'static str) -> Result<&'m str, AssemblyLoadError> {
    attrs.get(key).map(|v| v.as_str()).ok_or(AssemblyLoadError::MissingField(field))
}

fn resolve_value(raw: &str, defaults: &HashMap<String, String>) -> String {
    let mut out = raw.to_string();
    for (k, v) in defaults {
        out = out.replace(&format!("${}", k), v);
    }
    out
}

fn parse_bool(value: &str) -> Result<bool, AssemblyLoadError> {
    value.trim().parse::<bool>().map_err(|_| AssemblyLoadError::Parse(format!("invalid boolean: {}", value)))
}

fn parse_float(value: &str) -> Result<Float, AssemblyLoadError> {
    value.trim().parse::<Float>().map_err(|_| AssemblyLoadError::Parse(format!("invalid float: {}", value)))
}

fn parse_u64(value: &str) -> Result<u64, AssemblyLoadError> {
    value.trim().parse::<u64>().map_err(|_| AssemblyLoadError::Parse(format!("invalid integer: {}", value)))
}

fn parse_usize(value: &str) -> Result<usize, AssemblyLoadError> {
    value.trim().parse::<usize>().map_err(|_| AssemblyLoadError::Parse(format!("invalid integer: {}", value)))
}

fn parse_list(value: &str) -> Result<Vec<Float>, AssemblyLoadError> {
    value.split(',').map(|s| s.trim()).filter(|s| !s.is_empty()).map(parse_float).collect()
}

fn parse_vec3(value: &str) -> Result<Vector3f, AssemblyLoadError> {
    let parts = parse_list(value)?;
    if parts.len() != 3 {
        return Err(AssemblyLoadError::Parse(format!("invalid vec3: {}", value)));
    }
    Ok(Vector3f::new(parts[0], parts[1], parts[2]))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ASSEMBLY: &str = r#"
        <assembly lenient="true">
            <default name="width" value="3.0"/>
            <material name="EJ-204" builtin="true"/>
            <material name="EJ-550" builtin="true"/>
            <material name="SensLGlass" builtin="true"/>
            <material name="Air" builtin="true"/>
            <material name="Teflon" builtin="true"/>
            <material name="Mylar" refractive_index="1.0" attenuation_length="3000"
                      reflectivity="0.98" lambertian_fit="0.0,0.0,0.1,0.0"
                      lobe_angles="0,90" lobe_sigmas="5,5"/>
            <volume name="world" kind="ambient" material="Air" center="0,0,0" size="100,100,100"/>
            <volume name="reflector" kind="shell" material="Teflon" center="0,0,0.05" size="3.2,3.2,3.1"/>
            <volume name="pillar" kind="ordinary" material="EJ-204" center="0,0,0" size="$width,$width,3.0">
                <patch face="+z" generator="grooves" extent="3000" pitch="50" depth="10"/>
                <patch face="-x" generator="flat" extent="3000" cells="2"/>
            </volume>
            <volume name="gel" kind="ordinary" material="EJ-550" center="0,0,1.55" size="3.0,3.0,0.1"/>
            <volume name="window" kind="detector" material="SensLGlass" center="0,0,1.85" size="3.0,3.0,0.5"/>
            <source type="isotropic" material="EJ-204" volume="pillar" position="0,0,0.5" count="10"/>
            <source type="deposit" material="EJ-204" volume="pillar" position="0,0,0" energy="20"/>
            <tracking seed="42" threads="2" record="detected"/>
        </assembly>
    "#;

    #[test]
    fn test_parse_assembly() {
        let assembly = parse_assembly(ASSEMBLY, Path::new(".")).unwrap();
        let geometry = &assembly.geometry;
        assert_eq!(geometry.len(), 5);

        let pillar = geometry.volume(geometry.id("pillar").unwrap());
        assert_eq!(pillar.cuboid().size(), Vector3f::new(3000.0, 3000.0, 3000.0));
        assert!(pillar.patch(FaceDirection::PosZ).is_some());
        assert!(pillar.patch(FaceDirection::NegX).is_some());
        assert!(pillar.patch(FaceDirection::PosX).is_none());
        assert_eq!(pillar.touching(FaceDirection::PosZ), geometry.id("gel"));
        assert_eq!(geometry.volume(geometry.id("gel").unwrap()).touching(FaceDirection::PosZ),
                   geometry.id("window"));

        assert!(assembly.materials.get("Mylar").unwrap().reflector().is_some());
        assert_eq!(assembly.sources.len(), 2);
        assert_eq!(assembly.tracking, TrackingSettings {
            seed: Some(42),
            threads: Some(2),
            record: Some(RecordMode::DetectedOnly),
        });
    }

    #[test]
    fn test_unknown_material() {
        let xml = r#"<assembly><volume name="world" kind="ambient" material="Vacuum" center="0,0,0" size="1,1,1"/></assembly>"#;
        assert!(matches!(parse_assembly(xml, Path::new(".")), Err(AssemblyLoadError::UnknownMaterial(_))));
    }

    #[test]
    fn test_geometry_errors_propagate() {
        let xml = r#"<assembly>
            <material name="Air" builtin="true"/>
            <volume name="a" kind="ordinary" material="Air" center="0,0,0" size="1,1,1"/>
        </assembly>"#;
        assert!(matches!(parse_assembly(xml, Path::new(".")),
                         Err(AssemblyLoadError::Geometry(GeometryError::AmbientCount(0)))));
    }

    #[test]
    fn test_patch_outside_volume() {
        let xml = r#"<assembly><patch face="+z" generator="flat" extent="10"/></assembly>"#;
        assert!(matches!(parse_assembly(xml, Path::new(".")),
                         Err(AssemblyLoadError::MissingField("patch.volume"))));
    }

    #[test]
    fn test_malformed_values() {
        assert!(parse_vec3("1,2").is_err());
        assert!(parse_float("abc").is_err());
        assert_eq!(parse_list("1, 2,3").unwrap(), vec![1.0, 2.0, 3.0]);
    }
}
