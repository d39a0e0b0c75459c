use super::{for_each_element, read_index};
use crate::arena::Arena;
use crate::census::Census;
use crate::cursor::TokenCursor;
use crate::keys::Key;
use crate::{
    Animation, AnimationChannel, AnimationProperty, AnimationSampler, Error, Interpolation, Span,
};

struct ChannelTarget {
    node: Option<u32>,
    property: Option<AnimationProperty>,
}

fn read_target(
    cursor: &mut TokenCursor<'_>,
    animation: usize,
    channel: usize,
) -> Result<ChannelTarget, Error> {
    let mut target = ChannelTarget {
        node: None,
        property: None,
    };
    let keys = cursor.enter_object()?;
    for _ in 0..keys {
        match cursor.read_key()? {
            Key::Node => target.node = read_index(cursor)?,
            Key::Path => {
                let path = cursor.read_str()?;
                target.property = Some(AnimationProperty::from_gltf_name(path).ok_or_else(
                    || Error::UnknownAnimationPath {
                        animation,
                        channel,
                        value: path.to_string(),
                    },
                )?);
            }
            _ => {
                cursor.skip_value()?;
            }
        }
    }
    Ok(target)
}

/// Channel `sampler` members are local to their animation; `sampler_base` rebases them
/// onto the shared sampler array.
fn read_channel(
    cursor: &mut TokenCursor<'_>,
    animation: usize,
    channel: usize,
    sampler_base: u32,
) -> Result<AnimationChannel, Error> {
    let mut sampler = None;
    let mut target = None;
    let keys = cursor.enter_object()?;
    for _ in 0..keys {
        match cursor.read_key()? {
            Key::Sampler => sampler = Some(cursor.read_u32()?),
            Key::Target => target = Some(read_target(cursor, animation, channel)?),
            _ => {
                cursor.skip_value()?;
            }
        }
    }

    let missing = |field| Error::MissingField {
        entity: "animation channel",
        index: channel,
        field,
    };
    let target = target.ok_or_else(|| missing("target"))?;
    Ok(AnimationChannel {
        node: target.node,
        property: target.property.ok_or_else(|| missing("path"))?,
        sampler: sampler_base.saturating_add(sampler.ok_or_else(|| missing("sampler"))?),
    })
}

fn read_sampler(cursor: &mut TokenCursor<'_>, index: usize) -> Result<AnimationSampler, Error> {
    let mut input = None;
    let mut output = None;
    let mut interpolation = Interpolation::Linear;
    let keys = cursor.enter_object()?;
    for _ in 0..keys {
        match cursor.read_key()? {
            Key::Input => input = Some(cursor.read_u32()?),
            Key::Output => output = Some(cursor.read_u32()?),
            Key::Interpolation => {
                let name = cursor.read_str()?;
                interpolation = Interpolation::from_gltf_name(name).unwrap_or_else(|| {
                    log::warn!("animation sampler {index}: unknown interpolation '{name}'");
                    Interpolation::Linear
                });
            }
            _ => {
                cursor.skip_value()?;
            }
        }
    }

    let missing = |field| Error::MissingField {
        entity: "animation sampler",
        index,
        field,
    };
    Ok(AnimationSampler {
        input: input.ok_or_else(|| missing("input"))?,
        output: output.ok_or_else(|| missing("output"))?,
        interpolation,
    })
}

pub(super) fn decode_animations(
    cursor: &mut TokenCursor<'_>,
    census: &Census,
    arena: &mut Arena,
) -> Result<(), Error> {
    for_each_element(cursor, census.animations, |cursor, index, keys| {
        let sampler_base = arena.animation_samplers.next_index();
        let mut animation = Animation {
            channels: Span::new(arena.channels.next_index(), 0),
            samplers: Span::new(sampler_base, 0),
        };

        for _ in 0..keys {
            match cursor.read_key()? {
                Key::Channels => {
                    let start = arena.channels.next_index();
                    let count = cursor.enter_array()?;
                    for local in 0..count {
                        let channel = read_channel(cursor, index, local, sampler_base)?;
                        arena.channels.push(channel);
                    }
                    animation.channels = Span::new(start, count as u32);
                }
                Key::Samplers => {
                    let start = arena.animation_samplers.next_index();
                    let count = cursor.enter_array()?;
                    for _ in 0..count {
                        let sampler_index = arena.animation_samplers.next_index() as usize;
                        let sampler = read_sampler(cursor, sampler_index)?;
                        arena.animation_samplers.push(sampler);
                    }
                    animation.samplers = Span::new(start, count as u32);
                }
                _ => {
                    cursor.skip_value()?;
                }
            }
        }

        // Channels may precede their samplers in the document, so check once both are in.
        let samplers = animation.samplers.range();
        for channel in &arena.channels.as_slice()[animation.channels.range()] {
            if !samplers.contains(&(channel.sampler as usize)) {
                return Err(Error::InvalidReference {
                    kind: "animation sampler",
                    index: channel.sampler - sampler_base,
                    count: samplers.len(),
                });
            }
        }

        arena.animations.push(animation);
        Ok(())
    })
}
