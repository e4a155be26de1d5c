//! OBJ corpus import.
//!
//! Each object or group in the file becomes its own scene node, so multi-part
//! corpus models keep their parts. Materials are not loaded; frames are
//! shaded uniformly.

use std::path::Path;

use log::debug;

use crate::errors::CollaboratorError;
use crate::gfx::geometry::MeshData;
use crate::gfx::host::{MeshImporter, NodeId, SceneHost};

/// [`MeshImporter`] for Wavefront OBJ files.
#[derive(Debug, Clone)]
pub struct ObjImporter {
    options: tobj::LoadOptions,
}

impl ObjImporter {
    pub fn new() -> Self {
        Self {
            options: tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ignore_points: true,
                ignore_lines: true,
                ..Default::default()
            },
        }
    }
}

impl Default for ObjImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshImporter for ObjImporter {
    fn import_mesh(
        &mut self,
        host: &mut dyn SceneHost,
        path: &Path,
    ) -> Result<Vec<NodeId>, CollaboratorError> {
        let import_error = |reason: String| CollaboratorError::Import {
            path: path.to_path_buf(),
            reason,
        };

        // Material libraries are irrelevant here, so their load result is dropped.
        let (models, _materials) =
            tobj::load_obj(path, &self.options).map_err(|e| import_error(e.to_string()))?;

        let mut imported = Vec::with_capacity(models.len());
        for (i, model) in models.iter().enumerate() {
            let mesh = MeshData::from_flat(&model.mesh.positions, &model.mesh.indices);
            if mesh.is_empty() {
                continue;
            }
            let name = if model.name.is_empty() {
                format!("mesh_{}", i)
            } else {
                model.name.clone()
            };
            imported.push(host.add_mesh(&name, mesh)?);
        }

        if imported.is_empty() {
            return Err(import_error("no meshes found in OBJ".into()));
        }

        debug!("Imported {} meshes from {}", imported.len(), path.display());
        Ok(imported)
    }
}
