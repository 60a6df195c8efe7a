//! VMD (Vocaloid Motion Data) writer.
//!
//! Layout, little-endian throughout:
//! header (30 bytes magic + 20 bytes model name), bone record count,
//! 111-byte bone records, then zero counts for morph, camera, light and
//! self-shadow sections.

use crate::bone::{BoneFrame, FrameStream};
use crate::error::EncodeError;
use bytemuck::{Pod, Zeroable};
use encoding_rs::SHIFT_JIS;
use static_assertions::assert_eq_size;

pub const MAGIC: &[u8] = b"Vocaloid Motion Data 0002";

/// Every interpolation byte; a linear curve
pub const LINEAR_INTERPOLATION: u8 = 20;

const MODEL_NAME_BYTES: usize = 20;
const BONE_NAME_BYTES: usize = 15;

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct VmdHeader {
    pub magic: [u8; 30],
    pub model_name: [u8; MODEL_NAME_BYTES],
}

/// One bone keyframe record
#[repr(C, packed)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct VmdBoneRecord {
    pub name: [u8; BONE_NAME_BYTES],
    pub frame: u32,
    pub position: [f32; 3],
    /// x, y, z, w
    pub rotation: [f32; 4],
    pub interpolation: [u8; 64],
}

assert_eq_size!(VmdHeader, [u8; 50]);
assert_eq_size!(VmdBoneRecord, [u8; 111]);

/// Fields are stored in target order; swap on big-endian targets
fn le_f32(value: f32) -> f32 {
    f32::from_bits(value.to_bits().to_le())
}

/// Shift_JIS bytes, zero padded to `N`
fn encode_name<const N: usize>(name: &str) -> Result<[u8; N], EncodeError> {
    let (bytes, _, had_errors) = SHIFT_JIS.encode(name);
    if had_errors {
        return Err(EncodeError::UnencodableName {
            name: name.to_string(),
        });
    }
    if bytes.len() > N {
        return Err(EncodeError::NameTooLong {
            name: name.to_string(),
            capacity: N,
        });
    }
    let mut buffer = [0u8; N];
    buffer[..bytes.len()].copy_from_slice(&bytes);
    Ok(buffer)
}

impl VmdHeader {
    pub fn new(model_name: &str) -> Result<Self, EncodeError> {
        let mut magic = [0u8; 30];
        magic[..MAGIC.len()].copy_from_slice(MAGIC);
        Ok(Self {
            magic,
            model_name: encode_name::<MODEL_NAME_BYTES>(model_name)?,
        })
    }
}

impl VmdBoneRecord {
    pub fn new(frame: u32, bone: &BoneFrame) -> Result<Self, EncodeError> {
        let p = bone.position;
        let q = bone.rotation;
        Ok(Self {
            name: encode_name::<BONE_NAME_BYTES>(bone.bone.def().name_ja)?,
            frame: frame.to_le(),
            position: [le_f32(p.x), le_f32(p.y), le_f32(p.z)],
            rotation: [le_f32(q.x), le_f32(q.y), le_f32(q.z), le_f32(q.w)],
            interpolation: [LINEAR_INTERPOLATION; 64],
        })
    }
}

/// Records grouped by frame number.
/// Keyframes that round to the same frame merge, later bones winning.
fn frame_groups(stream: &FrameStream) -> Result<Vec<(u32, Vec<&BoneFrame>)>, EncodeError> {
    let mut groups: Vec<(u32, Vec<&BoneFrame>)> = Vec::with_capacity(stream.keyframes.len());

    for keyframe in &stream.keyframes {
        let frame = keyframe
            .frame_number(stream.frame_rate)
            .ok_or(EncodeError::FrameOverflow {
                time: keyframe.time,
            })?;

        match groups.last_mut() {
            Some((last, bones)) if *last == frame => {
                log::debug!("Keyframe at {}s shares frame {}; merging", keyframe.time, frame);
                for bone in &keyframe.bones {
                    match bones.iter_mut().find(|existing| existing.bone == bone.bone) {
                        Some(existing) => *existing = bone,
                        None => bones.push(bone),
                    }
                }
            }
            _ => groups.push((frame, keyframe.bones.iter().collect())),
        }
    }

    Ok(groups)
}

/// Serialize a frame stream. Frame numbers are `round(time * frame_rate)`.
pub fn encode(stream: &FrameStream, model_name: &str) -> Result<Vec<u8>, EncodeError> {
    let header = VmdHeader::new(model_name)?;
    let groups = frame_groups(stream)?;

    let count: usize = groups.iter().map(|(_, bones)| bones.len()).sum();
    let count_u32 = u32::try_from(count).map_err(|_| EncodeError::TooManyRecords { count })?;

    let mut out = Vec::with_capacity(
        std::mem::size_of::<VmdHeader>() + 4 + count * std::mem::size_of::<VmdBoneRecord>() + 4 * 4,
    );
    out.extend_from_slice(bytemuck::bytes_of(&header));
    out.extend_from_slice(&count_u32.to_le_bytes());

    for (frame, bones) in &groups {
        for bone in bones {
            let record = VmdBoneRecord::new(*frame, bone)?;
            out.extend_from_slice(bytemuck::bytes_of(&record));
        }
    }

    // Morph, camera, light, self-shadow
    for _ in 0..4 {
        out.extend_from_slice(&0u32.to_le_bytes());
    }

    log::debug!("Encoded {} bone records into {} bytes", count, out.len());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bone::{BoneId, KeyFrame};
    use glam::{Quat, Vec3};

    const HEADER: usize = 50;
    const RECORD: usize = 111;

    fn stream() -> FrameStream {
        FrameStream::new(
            60.0,
            vec![
                KeyFrame {
                    time: 0.0,
                    bones: vec![BoneFrame {
                        bone: BoneId::Head,
                        position: Vec3::ZERO,
                        rotation: Quat::from_xyzw(0.0, -0.258819, 0.0, 0.9659258),
                    }],
                },
                KeyFrame {
                    time: 0.5,
                    bones: vec![
                        BoneFrame {
                            bone: BoneId::Center,
                            position: Vec3::new(0.0, 2.0, 0.0),
                            rotation: Quat::IDENTITY,
                        },
                        BoneFrame {
                            bone: BoneId::ToeL,
                            position: Vec3::ZERO,
                            rotation: Quat::IDENTITY,
                        },
                    ],
                },
            ],
        )
    }

    fn record(bytes: &[u8], index: usize) -> VmdBoneRecord {
        let start = HEADER + 4 + index * RECORD;
        bytemuck::pod_read_unaligned(&bytes[start..start + RECORD])
    }

    #[test]
    fn test_layout_sizes() {
        let bytes = encode(&stream(), "").unwrap();
        assert_eq!(bytes.len(), HEADER + 4 + 3 * RECORD + 16);
        assert_eq!(&bytes[..MAGIC.len()], MAGIC);
        assert!(bytes[MAGIC.len()..HEADER].iter().all(|b| *b == 0));
        assert_eq!(u32::from_le_bytes([bytes[50], bytes[51], bytes[52], bytes[53]]), 3);
        assert!(bytes[bytes.len() - 16..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_bone_record_fields() {
        let bytes = encode(&stream(), "").unwrap();

        let head = record(&bytes, 0);
        let (name, _, _) = SHIFT_JIS.encode("頭");
        assert_eq!(&head.name[..name.len()], &name[..]);
        assert_eq!({ head.frame }, 0);
        let rotation = head.rotation;
        assert_eq!(rotation, [0.0, -0.258819, 0.0, 0.9659258]);
        assert!(head.interpolation.iter().all(|b| *b == LINEAR_INTERPOLATION));

        let center = record(&bytes, 1);
        assert_eq!({ center.frame }, 30);
        let position = center.position;
        assert_eq!(position, [0.0, 2.0, 0.0]);
    }

    #[test]
    fn test_frame_rate_changes_numbering() {
        let mut stream = stream();
        stream.frame_rate = 30.0;
        let bytes = encode(&stream, "").unwrap();
        assert_eq!({ record(&bytes, 2).frame }, 15);
    }

    #[test]
    fn test_model_name() {
        let bytes = encode(&stream(), "ミク").unwrap();
        let (name, _, _) = SHIFT_JIS.encode("ミク");
        assert_eq!(&bytes[30..30 + name.len()], &name[..]);

        let err = encode(&stream(), "a model name that is far too long").unwrap_err();
        assert!(matches!(err, EncodeError::NameTooLong { capacity: 20, .. }));
    }

    #[test]
    fn test_empty_stream_is_still_a_file() {
        let bytes = encode(&FrameStream::default(), "").unwrap();
        assert_eq!(bytes.len(), HEADER + 4 + 16);
    }

    #[test]
    fn test_frame_overflow() {
        let mut stream = stream();
        stream.keyframes[1].time = f32::INFINITY;
        assert!(matches!(
            encode(&stream, ""),
            Err(EncodeError::FrameOverflow { .. })
        ));
    }

    #[test]
    fn test_keyframes_on_one_frame_merge() {
        let turn = |degrees: f32| Quat::from_rotation_y(-degrees.to_radians());
        let stream = FrameStream::new(
            60.0,
            vec![
                KeyFrame {
                    time: 0.8,
                    bones: vec![
                        BoneFrame {
                            bone: BoneId::Head,
                            position: Vec3::ZERO,
                            rotation: turn(10.0),
                        },
                        BoneFrame {
                            bone: BoneId::Neck,
                            position: Vec3::ZERO,
                            rotation: turn(5.0),
                        },
                    ],
                },
                KeyFrame {
                    time: 0.805,
                    bones: vec![BoneFrame {
                        bone: BoneId::Head,
                        position: Vec3::ZERO,
                        rotation: turn(20.0),
                    }],
                },
            ],
        );

        let bytes = encode(&stream, "").unwrap();
        assert_eq!(bytes.len(), HEADER + 4 + 2 * RECORD + 16);

        let head = record(&bytes, 0);
        let neck = record(&bytes, 1);
        assert_eq!({ head.frame }, 48);
        assert_eq!({ neck.frame }, 48);
        let q = turn(20.0);
        assert_eq!({ head.rotation }, [q.x, q.y, q.z, q.w]);
    }

    #[test]
    fn test_frame_number_bounds() {
        let keyframe = KeyFrame {
            time: 4294967296.0,
            bones: Vec::new(),
        };
        assert_eq!(keyframe.frame_number(1.0), None);
        let keyframe = KeyFrame {
            time: 1000.0,
            bones: Vec::new(),
        };
        assert_eq!(keyframe.frame_number(60.0), Some(60000));
    }

    #[test]
    fn test_every_bone_name_fits() {
        for bone in BoneId::ALL {
            let name: Result<[u8; BONE_NAME_BYTES], _> = encode_name(bone.def().name_ja);
            assert!(name.is_ok(), "{} does not encode", bone);
        }
    }
}
