use super::{for_each_element, read_vector};
use crate::arena::Arena;
use crate::census::Census;
use crate::cursor::TokenCursor;
use crate::keys::Key;
use crate::{Error, Material, TextureSlot};

/// Reads a `textureInfo` object and returns its `index`. `texCoord`, `scale` and
/// `strength` are not kept.
fn read_texture_info(cursor: &mut TokenCursor<'_>) -> Result<Option<u32>, Error> {
    let mut index = None;
    let keys = cursor.enter_object()?;
    for _ in 0..keys {
        match cursor.read_key()? {
            Key::Index => index = Some(cursor.read_u32()?),
            _ => {
                cursor.skip_value()?;
            }
        }
    }
    Ok(index)
}

fn read_pbr(
    cursor: &mut TokenCursor<'_>,
    index: usize,
    material: &mut Material,
) -> Result<(), Error> {
    let keys = cursor.enter_object()?;
    for _ in 0..keys {
        match cursor.read_key()? {
            Key::BaseColorFactor => {
                material.diffuse_color =
                    read_vector::<4>(cursor, "material", index, "baseColorFactor")?;
            }
            Key::MetallicFactor => material.metalness = cursor.read_f32()?,
            Key::RoughnessFactor => material.roughness = cursor.read_f32()?,
            Key::BaseColorTexture => {
                material.textures[TextureSlot::Diffuse.index()] = read_texture_info(cursor)?;
            }
            Key::MetallicRoughnessTexture => {
                // One texture, metalness in blue and roughness in green.
                let texture = read_texture_info(cursor)?;
                material.textures[TextureSlot::Metalness.index()] = texture;
                material.textures[TextureSlot::Roughness.index()] = texture;
            }
            _ => {
                cursor.skip_value()?;
            }
        }
    }
    Ok(())
}

pub(super) fn decode_materials(
    cursor: &mut TokenCursor<'_>,
    census: &Census,
    arena: &mut Arena,
) -> Result<(), Error> {
    for_each_element(cursor, census.materials, |cursor, index, keys| {
        let mut material = Material::default();

        for _ in 0..keys {
            match cursor.read_key()? {
                Key::PbrMetallicRoughness => read_pbr(cursor, index, &mut material)?,
                Key::NormalTexture => {
                    material.textures[TextureSlot::Normal.index()] = read_texture_info(cursor)?;
                }
                Key::OcclusionTexture => {
                    material.textures[TextureSlot::Occlusion.index()] =
                        read_texture_info(cursor)?;
                }
                Key::EmissiveTexture => {
                    material.textures[TextureSlot::Emissive.index()] =
                        read_texture_info(cursor)?;
                }
                Key::EmissiveFactor => {
                    let [r, g, b] = read_vector::<3>(cursor, "material", index, "emissiveFactor")?;
                    material.emissive_color = [r, g, b, 1.0];
                }
                _ => {
                    cursor.skip_value()?;
                }
            }
        }

        arena.materials.push(material);
        Ok(())
    })
}
