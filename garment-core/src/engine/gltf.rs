//! Just enough glTF 2.0 to find mesh nodes, for [`super::scene::HeadlessScene`].
//!
//! Accepts both the JSON (`.gltf`) and binary (`.glb`) containers. Buffers, accessors and materials
//! are not read.

const GLB_MAGIC: u32 = u32::from_le_bytes(*b"glTF");
const CHUNK_JSON: u32 = u32::from_le_bytes(*b"JSON");
const GLB_HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;

#[derive(thiserror::Error, Debug)]
pub enum GltfError {
    #[error("file ends early")]
    Truncated,
    #[error("unsupported container version {0}")]
    UnsupportedVersion(u32),
    #[error("first chunk is not JSON")]
    MissingJson,
    #[error("asset version {0} is not glTF 2")]
    UnsupportedAsset(String),
    #[error("node {node} refers to missing mesh {mesh}")]
    DanglingMesh { node: usize, mesh: usize },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(serde::Deserialize)]
struct Asset {
    version: String,
}
#[derive(serde::Deserialize)]
struct Node {
    name: Option<String>,
    mesh: Option<usize>,
}
#[derive(serde::Deserialize)]
struct Mesh {
    name: Option<String>,
    #[serde(default)]
    primitives: Vec<serde::de::IgnoredAny>,
}
#[derive(serde::Deserialize)]
struct Document {
    asset: Asset,
    #[serde(default)]
    nodes: Vec<Node>,
    #[serde(default)]
    meshes: Vec<Mesh>,
}

/// A scene node that draws a mesh.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MeshNode {
    pub name: String,
    pub primitives: usize,
}

fn read_u32(bytes: &[u8], at: usize) -> Result<u32, GltfError> {
    let word = bytes.get(at..at + 4).ok_or(GltfError::Truncated)?;
    // Length checked by `get`.
    Ok(u32::from_le_bytes([word[0], word[1], word[2], word[3]]))
}

/// Find the JSON document inside a file, whichever container it is in.
fn json_chunk(bytes: &[u8]) -> Result<&[u8], GltfError> {
    if bytes.len() < 4 || read_u32(bytes, 0)? != GLB_MAGIC {
        // Not binary, assume plain JSON.
        return Ok(bytes);
    }
    let version = read_u32(bytes, 4)?;
    if version != 2 {
        return Err(GltfError::UnsupportedVersion(version));
    }
    let declared = usize::try_from(read_u32(bytes, 8)?).map_err(|_| GltfError::Truncated)?;
    let bytes = bytes.get(..declared).ok_or(GltfError::Truncated)?;

    let chunk_len =
        usize::try_from(read_u32(bytes, GLB_HEADER_LEN)?).map_err(|_| GltfError::Truncated)?;
    if read_u32(bytes, GLB_HEADER_LEN + 4)? != CHUNK_JSON {
        return Err(GltfError::MissingJson);
    }
    let start = GLB_HEADER_LEN + CHUNK_HEADER_LEN;
    bytes
        .get(start..start + chunk_len)
        .ok_or(GltfError::Truncated)
}

/// List every node that references a mesh, in node order.
pub fn mesh_nodes(bytes: &[u8]) -> Result<Vec<MeshNode>, GltfError> {
    let document: Document = serde_json::from_slice(json_chunk(bytes)?)?;
    if !document.asset.version.starts_with('2') {
        return Err(GltfError::UnsupportedAsset(document.asset.version));
    }
    document
        .nodes
        .iter()
        .enumerate()
        .filter_map(|(idx, node)| node.mesh.map(|mesh| (idx, node, mesh)))
        .map(|(idx, node, mesh_idx)| {
            let mesh = document
                .meshes
                .get(mesh_idx)
                .ok_or(GltfError::DanglingMesh {
                    node: idx,
                    mesh: mesh_idx,
                })?;
            let name = node
                .name
                .clone()
                .or_else(|| mesh.name.clone())
                .unwrap_or_else(|| format!("node{idx}"));
            Ok(MeshNode {
                name,
                primitives: mesh.primitives.len(),
            })
        })
        .collect()
}

/// Wrap a JSON document into a minimal binary container.
#[cfg(test)]
pub(crate) fn to_glb(json: &str) -> Vec<u8> {
    let mut chunk = json.as_bytes().to_vec();
    // Chunks are 4-byte aligned, padded with spaces.
    while chunk.len() % 4 != 0 {
        chunk.push(b' ');
    }
    let total = GLB_HEADER_LEN + CHUNK_HEADER_LEN + chunk.len();
    let mut glb = Vec::with_capacity(total);
    glb.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&u32::try_from(total).unwrap().to_le_bytes());
    glb.extend_from_slice(&u32::try_from(chunk.len()).unwrap().to_le_bytes());
    glb.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    glb.extend_from_slice(&chunk);
    glb
}
