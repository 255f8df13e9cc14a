//! Material-table (`.mtl`) parsing.
//!
//! Only the tags the scene shades with are interpreted: `newmtl`, `Ka`, `Kd`,
//! `Ks`, `Ns` and `map_Kd`. Everything else is skipped. Coefficients always
//! land on the material opened by the most recent `newmtl`.

use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use cgmath::Vector3;

use crate::{
    data_structures::model::Material,
    error::AssetError,
    resources::{for_each_line, parse_floats},
};

/// Materials and diffuse texture names keyed by material name.
#[derive(Clone, Debug, Default)]
pub struct MaterialTable {
    materials: HashMap<String, Material>,
    textures: HashMap<String, String>,
}

impl MaterialTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    /// File name of the diffuse map, relative to the material directory.
    pub fn texture(&self, name: &str) -> Option<&str> {
        self.textures.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

/// Parses `path` into `table`.
///
/// A file that cannot be opened is tolerated: a warning is logged, the table
/// is left untouched and `Ok(false)` is returned so geometry can still load
/// with default materials.
pub fn load_mtl(path: &Path, table: &mut MaterialTable) -> Result<bool, AssetError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            log::warn!(
                "Material table {} could not be opened ({}); materials fall back to defaults.",
                path.display(),
                e
            );
            return Ok(false);
        }
    };
    parse_mtl(BufReader::new(file), path, table)?;
    Ok(true)
}

pub fn parse_mtl<R: BufRead>(
    reader: R,
    path: &Path,
    table: &mut MaterialTable,
) -> Result<(), AssetError> {
    let mut current: Option<String> = None;

    for_each_line(reader, path, |line_no, line| {
        let mut tokens = line.split_whitespace();
        let Some(tag) = tokens.next() else {
            return Ok(());
        };
        if tag.starts_with('#') {
            return Ok(());
        }

        if tag == "newmtl" {
            let name = tokens
                .next()
                .ok_or_else(|| AssetError::material_table(path, line_no, "newmtl without a name"))?;
            table.materials.insert(name.to_string(), Material::default());
            table.textures.remove(name);
            current = Some(name.to_string());
            return Ok(());
        }

        if !matches!(tag, "Ka" | "Kd" | "Ks" | "Ns" | "map_Kd") {
            return Ok(());
        }

        let Some(name) = current.as_deref() else {
            return Err(AssetError::material_table(
                path,
                line_no,
                format!("`{tag}` appears before any `newmtl`"),
            ));
        };

        if tag == "map_Kd" {
            // Options such as `-s 1 1 1` may precede the file name.
            let file_name = tokens.last().ok_or_else(|| {
                AssetError::material_table(path, line_no, "map_Kd without a file name")
            })?;
            table.textures.insert(name.to_string(), file_name.to_string());
            return Ok(());
        }

        let Some(material) = table.materials.get_mut(name) else {
            return Ok(());
        };
        if tag == "Ns" {
            let [ns] = parse_floats::<1>(&mut tokens).ok_or_else(|| {
                AssetError::material_table(path, line_no, "Ns needs one number")
            })?;
            material.shininess = ns;
            return Ok(());
        }

        let [r, g, b] = parse_floats::<3>(&mut tokens).ok_or_else(|| {
            AssetError::material_table(path, line_no, format!("{tag} needs three numbers"))
        })?;
        let coefficient = Vector3::new(r, g, b);
        match tag {
            "Ka" => material.ambient = coefficient,
            "Kd" => material.diffuse = coefficient,
            _ => material.specular = coefficient,
        }
        Ok(())
    })
}
