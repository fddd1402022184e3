//! The `.navmesh` binary format
//!
//! Little-endian throughout. A fixed header is followed by the region, vertex,
//! cell and portal arrays, in that order and without padding. Every index is
//! validated on load so a mesh that loads can be queried without bounds
//! surprises.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Cursor, Read, Write};

use glam::Vec3;
use unwalk_common::{Error, Portal, Result};

use super::nav_mesh::{Cell, NavMesh, Region};

/// Magic number for navmesh files ('UNAV')
pub const NAVMESH_MAGIC: u32 = 0x5641_4E55; // 'UNAV' in little-endian

/// Current navmesh format version
pub const NAVMESH_VERSION: u32 = 1;

/// File extension of baked meshes
pub const NAVMESH_EXTENSION: &str = "navmesh";

const HEADER_SIZE: usize = 4 * 6 + 4 * 6;
const REGION_SIZE: usize = 4 * 3;
const VERT_SIZE: usize = 4 * 3;
const CELL_SIZE: usize = 4 * 5;
const PORTAL_SIZE: usize = 4 + 1 + 4 * 6;

fn malformed(e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        Error::MalformedFile("unexpected end of navmesh data".to_string())
    } else {
        Error::MalformedFile(e.to_string())
    }
}

fn read_vec3<R: Read>(reader: &mut R) -> io::Result<Vec3> {
    Ok(Vec3::new(
        reader.read_f32::<LittleEndian>()?,
        reader.read_f32::<LittleEndian>()?,
        reader.read_f32::<LittleEndian>()?,
    ))
}

fn write_vec3<W: Write>(writer: &mut W, v: Vec3) -> io::Result<()> {
    writer.write_f32::<LittleEndian>(v.x)?;
    writer.write_f32::<LittleEndian>(v.y)?;
    writer.write_f32::<LittleEndian>(v.z)?;
    Ok(())
}

/// File header
#[derive(Debug, Clone)]
struct NavMeshHeader {
    magic: u32,
    version: u32,
    region_count: u32,
    cell_count: u32,
    vert_count: u32,
    portal_count: u32,
    bmin: Vec3,
    bmax: Vec3,
}

impl NavMeshHeader {
    fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        Ok(Self {
            magic: reader.read_u32::<LittleEndian>()?,
            version: reader.read_u32::<LittleEndian>()?,
            region_count: reader.read_u32::<LittleEndian>()?,
            cell_count: reader.read_u32::<LittleEndian>()?,
            vert_count: reader.read_u32::<LittleEndian>()?,
            portal_count: reader.read_u32::<LittleEndian>()?,
            bmin: read_vec3(reader)?,
            bmax: read_vec3(reader)?,
        })
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u32::<LittleEndian>(self.magic)?;
        writer.write_u32::<LittleEndian>(self.version)?;
        writer.write_u32::<LittleEndian>(self.region_count)?;
        writer.write_u32::<LittleEndian>(self.cell_count)?;
        writer.write_u32::<LittleEndian>(self.vert_count)?;
        writer.write_u32::<LittleEndian>(self.portal_count)?;
        write_vec3(writer, self.bmin)?;
        write_vec3(writer, self.bmax)?;
        Ok(())
    }

    /// Bytes the arrays announced by this header occupy
    fn payload_size(&self) -> u64 {
        self.region_count as u64 * REGION_SIZE as u64
            + self.vert_count as u64 * VERT_SIZE as u64
            + self.cell_count as u64 * CELL_SIZE as u64
            + self.portal_count as u64 * PORTAL_SIZE as u64
    }
}

impl Region {
    fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        Ok(Self {
            group: reader.read_u32::<LittleEndian>()?,
            area: reader.read_u32::<LittleEndian>()?,
            footprint: reader.read_f32::<LittleEndian>()?,
        })
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u32::<LittleEndian>(self.group)?;
        writer.write_u32::<LittleEndian>(self.area)?;
        writer.write_f32::<LittleEndian>(self.footprint)?;
        Ok(())
    }
}

impl Cell {
    fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        Ok(Self {
            region: reader.read_u32::<LittleEndian>()?,
            first_vert: reader.read_u32::<LittleEndian>()?,
            vert_count: reader.read_u32::<LittleEndian>()?,
            first_portal: reader.read_u32::<LittleEndian>()?,
            portal_count: reader.read_u32::<LittleEndian>()?,
        })
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u32::<LittleEndian>(self.region)?;
        writer.write_u32::<LittleEndian>(self.first_vert)?;
        writer.write_u32::<LittleEndian>(self.vert_count)?;
        writer.write_u32::<LittleEndian>(self.first_portal)?;
        writer.write_u32::<LittleEndian>(self.portal_count)?;
        Ok(())
    }
}

fn read_portal<R: Read>(reader: &mut R) -> io::Result<(u32, u8, Vec3, Vec3)> {
    Ok((
        reader.read_u32::<LittleEndian>()?,
        reader.read_u8()?,
        read_vec3(reader)?,
        read_vec3(reader)?,
    ))
}

fn write_portal<W: Write>(writer: &mut W, portal: &Portal) -> io::Result<()> {
    writer.write_u32::<LittleEndian>(portal.neighbor as u32)?;
    writer.write_u8(u8::from(portal.explicit))?;
    write_vec3(writer, portal.left)?;
    write_vec3(writer, portal.right)?;
    Ok(())
}

/// Checks that a `first..first + count` range fits in `len` items
fn check_range(what: &str, cell: usize, first: u32, count: u32, len: usize) -> Result<()> {
    let end = first as u64 + count as u64;
    if end > len as u64 {
        return Err(Error::MalformedFile(format!(
            "cell {cell} {what} range {first}..{end} exceeds {len}"
        )));
    }
    Ok(())
}

impl NavMesh {
    /// Encodes the mesh in the `.navmesh` format
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let header = NavMeshHeader {
            magic: NAVMESH_MAGIC,
            version: NAVMESH_VERSION,
            region_count: self.regions.len() as u32,
            cell_count: self.cells.len() as u32,
            vert_count: self.verts.len() as u32,
            portal_count: self.portals.len() as u32,
            bmin: self.bmin,
            bmax: self.bmax,
        };

        let mut data = Vec::with_capacity(HEADER_SIZE + header.payload_size() as usize);
        header.write_to(&mut data)?;
        for region in &self.regions {
            region.write_to(&mut data)?;
        }
        for &vert in &self.verts {
            write_vec3(&mut data, vert)?;
        }
        for cell in &self.cells {
            cell.write_to(&mut data)?;
        }
        for portal in &self.portals {
            write_portal(&mut data, portal)?;
        }

        Ok(data)
    }

    /// Decodes and validates a mesh in the `.navmesh` format
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(data);

        let header = NavMeshHeader::read_from(&mut cursor).map_err(malformed)?;
        if header.magic != NAVMESH_MAGIC {
            return Err(Error::MalformedFile(format!(
                "wrong magic 0x{:08x}",
                header.magic
            )));
        }
        if header.version != NAVMESH_VERSION {
            return Err(Error::MalformedFile(format!(
                "unsupported version {}",
                header.version
            )));
        }

        // Refuse to allocate for arrays the data cannot hold
        let expected = HEADER_SIZE as u64 + header.payload_size();
        if (data.len() as u64) < expected {
            return Err(Error::MalformedFile(format!(
                "navmesh data is {} bytes, header announces {}",
                data.len(),
                expected
            )));
        }
        if data.len() as u64 > expected {
            return Err(Error::MalformedFile(format!(
                "{} trailing bytes after navmesh data",
                data.len() as u64 - expected
            )));
        }

        let regions = (0..header.region_count)
            .map(|_| Region::read_from(&mut cursor))
            .collect::<io::Result<Vec<_>>>()
            .map_err(malformed)?;
        let verts = (0..header.vert_count)
            .map(|_| read_vec3(&mut cursor))
            .collect::<io::Result<Vec<_>>>()
            .map_err(malformed)?;
        let cells = (0..header.cell_count)
            .map(|_| Cell::read_from(&mut cursor))
            .collect::<io::Result<Vec<_>>>()
            .map_err(malformed)?;
        let raw_portals = (0..header.portal_count)
            .map(|_| read_portal(&mut cursor))
            .collect::<io::Result<Vec<_>>>()
            .map_err(malformed)?;

        for (i, cell) in cells.iter().enumerate() {
            if cell.region as usize >= regions.len() {
                return Err(Error::MalformedFile(format!(
                    "cell {i} references region {} of {}",
                    cell.region,
                    regions.len()
                )));
            }
            check_range("vertex", i, cell.first_vert, cell.vert_count, verts.len())?;
            check_range(
                "portal",
                i,
                cell.first_portal,
                cell.portal_count,
                raw_portals.len(),
            )?;
        }

        let portals = raw_portals
            .into_iter()
            .enumerate()
            .map(|(i, (neighbor, explicit, left, right))| {
                if neighbor as usize >= cells.len() {
                    return Err(Error::MalformedFile(format!(
                        "portal {i} references cell {neighbor} of {}",
                        cells.len()
                    )));
                }
                let explicit = match explicit {
                    0 => false,
                    1 => true,
                    other => {
                        return Err(Error::MalformedFile(format!(
                            "portal {i} has invalid flag {other}"
                        )))
                    }
                };
                Ok(Portal {
                    neighbor: neighbor as usize,
                    left,
                    right,
                    explicit,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(NavMesh {
            regions,
            verts,
            cells,
            portals,
            bmin: header.bmin,
            bmax: header.bmax,
        })
    }
}
