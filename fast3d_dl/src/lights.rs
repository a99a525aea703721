//! Light records and the light set register.

use crate::{
    cmd::LightsRef,
    error::{F3DErrorKind, OutOfRange, Table},
    util::{dot, normalize},
};

/// Maximum number of directional lights that can be bound at once.
pub const MAX_LIGHTS: usize = 7;

/// A directional light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Light {
    #[allow(missing_docs)]
    pub color: [u8; 3],
    #[allow(missing_docs)]
    pub dir: [i8; 3],
}

impl Light {
    #[allow(missing_docs)]
    pub fn new(color: [u8; 3], dir: [i8; 3]) -> Self {
        Self { color, dir }
    }
}

/// A `LightsN` record: one ambient color and up to [MAX_LIGHTS] directional lights.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Lights {
    #[allow(missing_docs)]
    pub ambient: [u8; 3],
    #[allow(missing_docs)]
    pub directional: Vec<Light>,
}

impl Lights {
    #[allow(missing_docs)]
    pub fn new(ambient: [u8; 3], directional: Vec<Light>) -> Self {
        Self {
            ambient,
            directional,
        }
    }

    /// Equivalent of `gdSPDefLights1`.
    pub fn lights1(ambient: [u8; 3], color: [u8; 3], dir: [i8; 3]) -> Self {
        Self::new(ambient, vec![Light::new(color, dir)])
    }

    /// Resolves a record member, treating the member after the last directional light as
    /// the ambient light.
    pub fn member(&self, member: u32) -> Result<Light, F3DErrorKind> {
        let member = member as usize;
        match member.cmp(&self.directional.len()) {
            std::cmp::Ordering::Less => Ok(self.directional[member]),
            std::cmp::Ordering::Equal => Ok(Light::new(self.ambient, [0; 3])),
            std::cmp::Ordering::Greater => Err(OutOfRange::new(
                Table::LightSlot,
                member,
                self.directional.len() + 1,
            )
            .into()),
        }
    }
}

/// The currently bound lights.
///
/// As in the microcode, the ambient light lives in the slot right after the last
/// directional light.
///
/// A light count can only be set once every slot it covers, including the ambient slot,
/// has been bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LightSet {
    slots: [Light; MAX_LIGHTS + 1],
    bound: [bool; MAX_LIGHTS + 1],
    num_dir_lights: u32,
}

impl LightSet {
    /// Replaces every binding with the contents of a lights record.
    pub fn set_lights(&mut self, record: &Lights) -> Result<(), F3DErrorKind> {
        if record.directional.len() > MAX_LIGHTS {
            return Err(OutOfRange::new(
                Table::LightSlot,
                record.directional.len(),
                MAX_LIGHTS,
            )
            .into());
        }
        let mut next = Self {
            num_dir_lights: record.directional.len() as u32,
            ..Default::default()
        };
        next.slots[..record.directional.len()].copy_from_slice(&record.directional);
        next.slots[record.directional.len()] = Light::new(record.ambient, [0; 3]);
        next.bound[..=record.directional.len()].fill(true);
        *self = next;
        Ok(())
    }

    /// Binds a light to slot `n` (1-based).
    pub fn set_light(&mut self, n: u32, light: Light) -> Result<(), F3DErrorKind> {
        let index = (n as usize)
            .checked_sub(1)
            .filter(|&index| index < self.slots.len())
            .ok_or(OutOfRange::new(Table::LightSlot, n as usize, self.slots.len()))?;
        self.slots[index] = light;
        self.bound[index] = true;
        Ok(())
    }

    /// Sets the number of directional lights. Slots `0..=n` must all be bound.
    pub fn set_num_lights(&mut self, n: u32) -> Result<(), F3DErrorKind> {
        if n as usize > MAX_LIGHTS {
            return Err(OutOfRange::new(Table::LightSlot, n as usize, MAX_LIGHTS + 1).into());
        }
        let bound = self.bound_count();
        if bound <= n as usize {
            return Err(OutOfRange::new(Table::LightSlot, bound, bound).into());
        }
        self.num_dir_lights = n;
        Ok(())
    }

    /// Binds a member of a lights record to slot `n`.
    pub fn bind(&mut self, record: &Lights, light: LightsRef, n: u32) -> Result<(), F3DErrorKind> {
        let light = record.member(light.member)?;
        self.set_light(n, light)
    }

    /// Number of consecutive bound slots starting from the first.
    pub fn bound_count(&self) -> usize {
        self.bound.iter().take_while(|&&bound| bound).count()
    }

    #[allow(missing_docs)]
    pub fn num_dir_lights(&self) -> u32 {
        self.num_dir_lights
    }

    #[allow(missing_docs)]
    pub fn directional(&self) -> &[Light] {
        &self.slots[..self.num_dir_lights as usize]
    }

    #[allow(missing_docs)]
    pub fn ambient(&self) -> [u8; 3] {
        self.slots[self.num_dir_lights as usize].color
    }

    /// Computes the lit color for a vertex normal.
    pub fn shade(&self, normal: [i8; 3]) -> [u8; 3] {
        let mut shade_rgb = self.ambient();
        let n = [
            normal[0] as f32 / 127.0,
            normal[1] as f32 / 127.0,
            normal[2] as f32 / 127.0,
        ];
        for light in self.directional() {
            let light_n = normalize([
                light.dir[0] as f32 / 127.0,
                light.dir[1] as f32 / 127.0,
                light.dir[2] as f32 / 127.0,
            ]);
            let intensity = dot(light_n, n).max(0.0);
            for i in 0..3 {
                shade_rgb[i] =
                    (shade_rgb[i] as f32 + intensity * light.color[i] as f32).min(255.0) as u8;
            }
        }
        shade_rgb
    }
}
