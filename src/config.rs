//! Key-value configuration.
//!
//! The scene never parses configuration itself; it asks a [`ConfigProvider`]
//! for typed values and always supplies the default to fall back on.
//! [`IniConfig`] is the provider used by the binary: `[section]` headers,
//! `key=value` lines, `#` comments. Keys are addressed as `section.key`.

use std::{collections::HashMap, path::Path, str::FromStr};

use cgmath::Vector3;

use crate::resources::load_string;

pub trait ConfigProvider {
    fn get_float(&self, key: &str, default: f32) -> f32;
    fn get_vec3(&self, key: &str, default: Vector3<f32>) -> Vector3<f32>;
    fn get_string(&self, key: &str, default: &str) -> String;
    fn get_bool(&self, key: &str, default: bool) -> bool;
}

#[derive(Clone, Debug, Default)]
pub struct IniConfig {
    values: HashMap<String, String>,
}

impl IniConfig {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        Ok(Self::parse(&load_string(path)?))
    }

    pub fn parse(text: &str) -> Self {
        let mut values = HashMap::new();
        let mut section = String::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if let Some(rest) = line.strip_prefix('[') {
                section = rest.split(']').next().unwrap_or_default().trim().to_string();
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let full_key = if section.is_empty() {
                key.to_string()
            } else {
                format!("{section}.{key}")
            };
            values.insert(full_key, value.trim().to_string());
        }
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    fn parsed<T: FromStr>(&self, key: &str, default: T) -> T {
        match self.get(key) {
            None => default,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                log::warn!("Config value `{key}` = `{raw}` is not valid; using the default.");
                default
            }),
        }
    }
}

impl ConfigProvider for IniConfig {
    fn get_float(&self, key: &str, default: f32) -> f32 {
        self.parsed(key, default)
    }

    fn get_vec3(&self, key: &str, default: Vector3<f32>) -> Vector3<f32> {
        let Some(raw) = self.get(key) else {
            return default;
        };
        let parts: Vec<f32> = raw
            .split(',')
            .filter_map(|part| part.trim().parse().ok())
            .collect();
        match parts.as_slice() {
            [x, y, z] => Vector3::new(*x, *y, *z),
            [v] => Vector3::new(*v, *v, *v),
            _ => {
                log::warn!("Config value `{key}` = `{raw}` is not a vector; using the default.");
                default
            }
        }
    }

    fn get_string(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_string()
    }

    fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            None => default,
            Some(raw) => raw.eq_ignore_ascii_case("true"),
        }
    }
}
