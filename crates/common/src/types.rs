use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque handle to a placed object owned by the host application.
///
/// The culling subsystem stores handles and indices only; it never owns or
/// destroys the objects they refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectHandle(pub Uuid);

impl ObjectHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// A culling domain: one of the three size tiers for static meshes, plus
/// NPCs and ambient sound emitters. Each domain owns its own bounding-sphere
/// index, registry, and realization queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Domain {
    SmallMesh,
    MediumMesh,
    LargeMesh,
    Npc,
    Sound,
}

impl Domain {
    /// All domains, in dispatch order. Realization order is guaranteed only
    /// within a domain, never across.
    pub const ALL: [Domain; Domain::COUNT] = [
        Domain::SmallMesh,
        Domain::MediumMesh,
        Domain::LargeMesh,
        Domain::Npc,
        Domain::Sound,
    ];

    pub const COUNT: usize = 5;

    /// Index into per-domain state arrays.
    pub fn index(self) -> usize {
        match self {
            Domain::SmallMesh => 0,
            Domain::MediumMesh => 1,
            Domain::LargeMesh => 2,
            Domain::Npc => 3,
            Domain::Sound => 4,
        }
    }

    /// Whether this domain is one of the mesh size tiers.
    pub fn is_mesh_tier(self) -> bool {
        matches!(
            self,
            Domain::SmallMesh | Domain::MediumMesh | Domain::LargeMesh
        )
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Domain::SmallMesh => "small-mesh",
            Domain::MediumMesh => "medium-mesh",
            Domain::LargeMesh => "large-mesh",
            Domain::Npc => "npc",
            Domain::Sound => "sound",
        };
        f.write_str(name)
    }
}
