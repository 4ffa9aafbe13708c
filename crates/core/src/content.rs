//! Cells, connections and the things that live in rooms.
//!
//! Most of the variety here is fluff for the describer and renderer; the
//! generator only cares whether a cell is a room and whether a connection is
//! locked, and by which key.

use rand_chacha::rand_core::Rng;
use serde::{Deserialize, Serialize};

use crate::mapgen::seed::{coin, percent, pick, roll};
use crate::types::{Coord, KeyId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Material {
    Stone,
    Brick,
    Wood,
    Concrete,
    Clay,
}

impl Material {
    pub const ALL: [Self; 5] = [Self::Stone, Self::Brick, Self::Wood, Self::Concrete, Self::Clay];

    pub fn label(self) -> &'static str {
        match self {
            Self::Stone => "stone",
            Self::Brick => "brick",
            Self::Wood => "wood",
            Self::Concrete => "concrete",
            Self::Clay => "clay",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Lighting {
    Barely,
    Dimly,
    Passably,
    Well,
    Brightly,
}

impl Lighting {
    pub const ALL: [Self; 5] =
        [Self::Barely, Self::Dimly, Self::Passably, Self::Well, Self::Brightly];

    pub fn label(self) -> &'static str {
        match self {
            Self::Barely => "barely",
            Self::Dimly => "dimly",
            Self::Passably => "passably",
            Self::Well => "well",
            Self::Brightly => "brightly",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Surface {
    pub floor: Material,
    pub walls: Material,
    pub lighting: Lighting,
}

impl Surface {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let floor = pick(rng, &Material::ALL);
        let walls = pick(rng, &Material::ALL);
        let lighting = pick(rng, &Lighting::ALL);
        Self { floor, walls, lighting }
    }

    pub fn describe(&self, noun: &str) -> String {
        if self.floor == self.walls {
            format!("a {} lit {noun}, made of {}", self.lighting.label(), self.walls.label())
        } else {
            format!(
                "a {} lit {noun}, made of {} and {}",
                self.lighting.label(),
                self.walls.label(),
                self.floor.label()
            )
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EnemyFamily {
    Insect,
    Ghost,
    Humanoid,
}

impl EnemyFamily {
    pub const ALL: [Self; 3] = [Self::Insect, Self::Ghost, Self::Humanoid];
}

/// Encounter strength, escalating along the key chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EncounterTier {
    Minion,
    Soldier,
    MiniBoss,
    Boss,
}

impl EncounterTier {
    /// Tier for the `placed`-th key (1-based) of a chain spread over
    /// `pool_size` leaves. Scales linearly, topping out at boss.
    pub fn for_chain_position(placed: usize, pool_size: usize) -> Self {
        if pool_size == 0 {
            return Self::Minion;
        }
        match (placed * 5) / pool_size {
            0 => Self::Minion,
            1 => Self::Soldier,
            2 => Self::MiniBoss,
            _ => Self::Boss,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GearGrade {
    Crude,
    Common,
    Rare,
    Epic,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Gear {
    pub weapon: GearGrade,
    pub armour: GearGrade,
}

impl Gear {
    fn random<R: Rng + ?Sized>(tier: EncounterTier, rng: &mut R) -> Self {
        let upgrade = |rng: &mut R, chance, better, worse| {
            if percent(rng, chance) { better } else { worse }
        };
        match tier {
            EncounterTier::Minion => Self {
                weapon: upgrade(rng, 10, GearGrade::Common, GearGrade::Crude),
                armour: upgrade(rng, 10, GearGrade::Common, GearGrade::Crude),
            },
            EncounterTier::Soldier => Self {
                weapon: upgrade(rng, 50, GearGrade::Common, GearGrade::Crude),
                armour: upgrade(rng, 50, GearGrade::Common, GearGrade::Crude),
            },
            EncounterTier::MiniBoss => Self {
                weapon: upgrade(rng, 10, GearGrade::Rare, GearGrade::Common),
                armour: GearGrade::Common,
            },
            EncounterTier::Boss => Self {
                weapon: upgrade(rng, 10, GearGrade::Epic, GearGrade::Rare),
                armour: GearGrade::Rare,
            },
        }
    }
}

pub struct EnemyStats {
    pub max_health: i32,
    pub damage_dice_count: u32,
    pub damage_dice_sides: u32,
    pub base_damage: i32,
    pub success_modifier: i32,
    pub defense_modifier: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Enemy {
    pub family: EnemyFamily,
    pub tier: EncounterTier,
    /// Only humanoids carry gear; their offence and defence come from it.
    pub gear: Option<Gear>,
}

impl Enemy {
    pub fn new<R: Rng + ?Sized>(family: EnemyFamily, tier: EncounterTier, rng: &mut R) -> Self {
        let gear = match family {
            EnemyFamily::Humanoid => Some(Gear::random(tier, rng)),
            EnemyFamily::Insect | EnemyFamily::Ghost => None,
        };
        Self { family, tier, gear }
    }

    pub fn random<R: Rng + ?Sized>(tier: EncounterTier, rng: &mut R) -> Self {
        let family = pick(rng, &EnemyFamily::ALL);
        Self::new(family, tier, rng)
    }

    pub fn name(&self) -> &'static str {
        match (self.family, self.tier) {
            (EnemyFamily::Insect, EncounterTier::Minion) => "worker insect",
            (EnemyFamily::Insect, EncounterTier::Soldier) => "soldier insect",
            (EnemyFamily::Insect, EncounterTier::MiniBoss) => "destroyer insect",
            (EnemyFamily::Insect, EncounterTier::Boss) => "insect queen",
            (EnemyFamily::Ghost, EncounterTier::Minion) => "shade",
            (EnemyFamily::Ghost, EncounterTier::Soldier) => "poltergeist",
            (EnemyFamily::Ghost, EncounterTier::MiniBoss) => "wraith",
            (EnemyFamily::Ghost, EncounterTier::Boss) => "ghoul",
            (EnemyFamily::Humanoid, EncounterTier::Minion) => "humanoid minion",
            (EnemyFamily::Humanoid, EncounterTier::Soldier) => "humanoid soldier",
            (EnemyFamily::Humanoid, EncounterTier::MiniBoss) => "humanoid chief",
            (EnemyFamily::Humanoid, EncounterTier::Boss) => "humanoid warlord",
        }
    }

    pub fn stats(&self) -> EnemyStats {
        let (max_health, damage_dice_count, damage_dice_sides, base_damage, success, defense) =
            match (self.family, self.tier) {
                (EnemyFamily::Insect, EncounterTier::Minion) => (20, 2, 4, 0, 10, 0),
                (EnemyFamily::Insect, EncounterTier::Soldier) => (40, 3, 6, 0, 20, 20),
                (EnemyFamily::Insect, EncounterTier::MiniBoss) => (80, 3, 8, 0, 40, 30),
                (EnemyFamily::Insect, EncounterTier::Boss) => (160, 3, 12, 0, 80, 50),
                (EnemyFamily::Ghost, EncounterTier::Minion) => (20, 2, 6, 10, 30, 10),
                (EnemyFamily::Ghost, EncounterTier::Soldier) => (50, 3, 6, 20, 40, 20),
                (EnemyFamily::Ghost, EncounterTier::MiniBoss) => (80, 3, 8, 20, 40, 30),
                (EnemyFamily::Ghost, EncounterTier::Boss) => (100, 3, 12, 30, 50, 50),
                (EnemyFamily::Humanoid, _) => (100, 0, 0, 0, 0, 0),
            };
        EnemyStats {
            max_health,
            damage_dice_count,
            damage_dice_sides,
            base_damage,
            success_modifier: success,
            defense_modifier: defense,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum KeySize {
    Small,
    Medium,
    Large,
    Huge,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum KeyMaterial {
    Iron,
    Brass,
    Lead,
    Wood,
    Glass,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum KeyQuality {
    Dirty,
    Worn,
    Plain,
    Embellished,
    Fancy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key {
    pub id: KeyId,
    pub size: KeySize,
    pub material: KeyMaterial,
    pub quality: KeyQuality,
}

impl Key {
    pub fn random<R: Rng + ?Sized>(id: KeyId, rng: &mut R) -> Self {
        Self {
            id,
            size: pick(rng, &[KeySize::Small, KeySize::Medium, KeySize::Large, KeySize::Huge]),
            material: pick(
                rng,
                &[
                    KeyMaterial::Iron,
                    KeyMaterial::Brass,
                    KeyMaterial::Lead,
                    KeyMaterial::Wood,
                    KeyMaterial::Glass,
                ],
            ),
            quality: pick(
                rng,
                &[
                    KeyQuality::Dirty,
                    KeyQuality::Worn,
                    KeyQuality::Plain,
                    KeyQuality::Embellished,
                    KeyQuality::Fancy,
                ],
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Item {
    Key(Key),
    /// The win condition, always found in the end room.
    Crown,
    HealthChest,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Room {
    pub enemies: Vec<Enemy>,
    pub items: Vec<Item>,
}

impl Room {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut room = Self::default();
        if percent(rng, 20) {
            room.enemies.push(Enemy::new(EnemyFamily::Insect, EncounterTier::Minion, rng));
        }
        if percent(rng, 20) {
            room.enemies.push(Enemy::new(EnemyFamily::Ghost, EncounterTier::Minion, rng));
        }
        if percent(rng, 20) {
            room.enemies.push(Enemy::new(EnemyFamily::Humanoid, EncounterTier::Minion, rng));
        }
        if percent(rng, 10) {
            room.enemies.push(Enemy::random(EncounterTier::Soldier, rng));
        }
        if percent(rng, 10) {
            room.items.push(Item::HealthChest);
        }
        room
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.items.iter().filter_map(|item| match item {
            Item::Key(key) => Some(key),
            Item::Crown | Item::HealthChest => None,
        })
    }

    pub fn has_crown(&self) -> bool {
        self.items.contains(&Item::Crown)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    Passage,
    Room(Room),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub coord: Coord,
    pub kind: CellKind,
    pub surface: Surface,
    /// Presentation only.
    pub visible: bool,
}

impl Cell {
    /// Initial fill: a coin flip between a stocked room and a passage.
    pub fn random<R: Rng + ?Sized>(coord: Coord, rng: &mut R) -> Self {
        if coin(rng) { Self::random_room(coord, rng) } else { Self::passage(coord, rng) }
    }

    pub fn passage<R: Rng + ?Sized>(coord: Coord, rng: &mut R) -> Self {
        Self { coord, kind: CellKind::Passage, surface: Surface::random(rng), visible: false }
    }

    pub fn random_room<R: Rng + ?Sized>(coord: Coord, rng: &mut R) -> Self {
        let surface = Surface::random(rng);
        let room = Room::random(rng);
        Self { coord, kind: CellKind::Room(room), surface, visible: false }
    }

    pub fn empty_room<R: Rng + ?Sized>(coord: Coord, rng: &mut R) -> Self {
        Self {
            coord,
            kind: CellKind::Room(Room::default()),
            surface: Surface::random(rng),
            visible: false,
        }
    }

    pub fn is_room(&self) -> bool {
        matches!(self.kind, CellKind::Room(_))
    }

    pub fn room(&self) -> Option<&Room> {
        match &self.kind {
            CellKind::Room(room) => Some(room),
            CellKind::Passage => None,
        }
    }

    pub fn room_mut(&mut self) -> Option<&mut Room> {
        match &mut self.kind {
            CellKind::Room(room) => Some(room),
            CellKind::Passage => None,
        }
    }

    pub fn noun(&self) -> &'static str {
        match self.kind {
            CellKind::Room(_) => "room",
            CellKind::Passage => "passage",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AccessSize {
    Cramped,
    Standard,
    Wide,
    Large,
    Huge,
}

impl AccessSize {
    pub const ALL: [Self; 5] = [Self::Cramped, Self::Standard, Self::Wide, Self::Large, Self::Huge];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BarrierMaterial {
    Steel,
    Wood,
    Iron,
    Stone,
}

impl BarrierMaterial {
    pub const ALL: [Self; 4] = [Self::Steel, Self::Wood, Self::Iron, Self::Stone];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OpeningStyle {
    Doorway,
    Gateway,
    Archway,
    Entryway,
    Hole,
    Cleft,
    Crevice,
    Aperture,
    Inlet,
}

impl OpeningStyle {
    pub const ALL: [Self; 9] = [
        Self::Doorway,
        Self::Gateway,
        Self::Archway,
        Self::Entryway,
        Self::Hole,
        Self::Cleft,
        Self::Crevice,
        Self::Aperture,
        Self::Inlet,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionKind {
    Opening(OpeningStyle),
    Door(BarrierMaterial),
    Gate(BarrierMaterial),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Lock {
    pub key: KeyId,
    pub engaged: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub kind: ConnectionKind,
    pub size: AccessSize,
    pub is_open: bool,
    pub lock: Option<Lock>,
}

impl Connection {
    /// Door, gate or opening with equal odds. Doors and gates start open on a
    /// coin flip; openings are always open.
    pub fn random_unlocked<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let size = pick(rng, &AccessSize::ALL);
        match roll(rng, 3) {
            0 => Self {
                kind: ConnectionKind::Door(pick(rng, &BarrierMaterial::ALL)),
                size,
                is_open: coin(rng),
                lock: None,
            },
            1 => Self {
                kind: ConnectionKind::Gate(pick(rng, &BarrierMaterial::ALL)),
                size,
                is_open: coin(rng),
                lock: None,
            },
            _ => Self {
                kind: ConnectionKind::Opening(pick(rng, &OpeningStyle::ALL)),
                size,
                is_open: true,
                lock: None,
            },
        }
    }

    /// A closed door or gate whose lock answers to `key`.
    pub fn random_locked<R: Rng + ?Sized>(key: KeyId, rng: &mut R) -> Self {
        let size = pick(rng, &AccessSize::ALL);
        let material = pick(rng, &BarrierMaterial::ALL);
        let kind =
            if coin(rng) { ConnectionKind::Door(material) } else { ConnectionKind::Gate(material) };
        Self { kind, size, is_open: false, lock: Some(Lock { key, engaged: true }) }
    }

    pub fn is_lockable(&self) -> bool {
        matches!(self.kind, ConnectionKind::Door(_) | ConnectionKind::Gate(_))
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_some_and(|lock| lock.engaged)
    }

    pub fn key(&self) -> Option<KeyId> {
        self.lock.map(|lock| lock.key)
    }

    /// Disengages the lock if its key is among `held`. Returns whether the
    /// connection is unlocked afterwards.
    pub fn unlock(&mut self, held: &[KeyId]) -> bool {
        match &mut self.lock {
            Some(lock) if lock.engaged => {
                if held.contains(&lock.key) {
                    lock.engaged = false;
                }
                !lock.engaged
            }
            _ => true,
        }
    }

    /// Opens the connection, unlocking it first if needed.
    pub fn open(&mut self, held: &[KeyId]) -> bool {
        if !self.unlock(held) {
            return false;
        }
        self.is_open = true;
        true
    }

    pub fn can_pass(&self, held: &[KeyId]) -> bool {
        if self.is_open {
            return true;
        }
        match self.lock {
            Some(lock) if lock.engaged => held.contains(&lock.key),
            _ => true,
        }
    }

    pub fn noun(&self) -> &'static str {
        match self.kind {
            ConnectionKind::Opening(_) => "opening",
            ConnectionKind::Door(_) => "door",
            ConnectionKind::Gate(_) => "gate",
        }
    }
}

#[cfg(test)]
mod tests {
    use rand_chacha::ChaCha8Rng;
    use rand_chacha::rand_core::SeedableRng;

    use super::*;

    #[test]
    fn encounter_tier_escalates_across_the_chain() {
        let tiers: Vec<_> =
            (1..=10).map(|placed| EncounterTier::for_chain_position(placed, 10)).collect();
        assert_eq!(tiers[0], EncounterTier::Minion);
        assert_eq!(tiers[1], EncounterTier::Soldier);
        assert_eq!(tiers[4], EncounterTier::MiniBoss);
        assert_eq!(tiers[9], EncounterTier::Boss);
        assert!(tiers.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn locked_connection_only_yields_to_its_own_key() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut connection = Connection::random_locked(KeyId(4), &mut rng);
        assert!(connection.is_lockable());
        assert!(connection.is_locked());
        assert!(!connection.can_pass(&[KeyId(1)]));
        assert!(!connection.open(&[KeyId(1)]));
        assert!(connection.is_locked());

        assert!(connection.can_pass(&[KeyId(1), KeyId(4)]));
        assert!(connection.open(&[KeyId(4)]));
        assert!(!connection.is_locked());
        assert!(connection.is_open);
        assert_eq!(connection.key(), Some(KeyId(4)));
        assert!(connection.can_pass(&[]));
    }

    #[test]
    fn unlocked_connections_never_carry_a_lock() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..200 {
            let connection = Connection::random_unlocked(&mut rng);
            assert!(connection.lock.is_none());
            assert!(connection.can_pass(&[]));
            if let ConnectionKind::Opening(_) = connection.kind {
                assert!(connection.is_open);
            }
        }
    }

    #[test]
    fn only_humanoids_carry_gear() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for family in EnemyFamily::ALL {
            let enemy = Enemy::new(family, EncounterTier::Boss, &mut rng);
            assert_eq!(enemy.gear.is_some(), family == EnemyFamily::Humanoid);
        }
        let boss = Enemy::new(EnemyFamily::Humanoid, EncounterTier::Boss, &mut rng);
        assert_eq!(boss.gear.map(|gear| gear.armour), Some(GearGrade::Rare));
    }

    #[test]
    fn empty_room_holds_nothing() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let cell = Cell::empty_room(Coord::new(1, 1), &mut rng);
        let room = cell.room().expect("empty room is a room");
        assert!(room.enemies.is_empty());
        assert!(room.items.is_empty());
        assert!(!cell.visible);
    }
}
