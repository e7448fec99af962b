//! # Packet Catalog
//!
//! Typed packet bodies. Each body is a fixed schema read top to bottom with
//! no backtracking; the frame envelope (length + id) is handled by
//! [`crate::framing`].
//!
//! ## Count fields
//!
//! Packets that carry a list also carry an explicit declared count
//! (`property_count`, `pack_count`, ...). Encoding checks the count against
//! the list before writing any field, so a mismatched packet fails with
//! [`ServerError::CountMismatch`] and emits nothing. The `new` constructors
//! fill the count from the list.

use bytes::{Buf, BufMut};
use mcsrv_core::{BlockPosition, GameMode, NextState, Result, ServerError};
use uuid::Uuid;

use super::codecs::*;

//=== Generic envelopes ===//

/// A packet with no body (acknowledgements, status request, finish configuration)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmptyPacket;

impl Encode for EmptyPacket {
    fn encode<B: BufMut>(&self, _buf: &mut B) -> Result<()> {
        Ok(())
    }
}

impl Decode for EmptyPacket {
    fn decode<B: Buf>(_buf: &mut B) -> Result<Self> {
        Ok(Self)
    }
}

/// A packet whose body is carried as opaque bytes
///
/// Decoding takes everything left in the frame, so writing the data back
/// reproduces the original body byte for byte.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PacketWithData {
    pub data: Vec<u8>,
}

impl PacketWithData {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }
}

impl Encode for PacketWithData {
    fn encode<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        buf.put_slice(&self.data);
        Ok(())
    }
}

impl Decode for PacketWithData {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self> {
        let data = buf.copy_to_bytes(buf.remaining()).to_vec();
        Ok(Self { data })
    }
}

//=== Handshake ===//

/// First packet of every connection
///
/// # Packet Format
/// ```text
/// {VarInt protocol_version}{String server_address}{u16 server_port}{VarInt next_state}
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handshake {
    pub protocol_version: i32,
    pub server_address: String,
    pub server_port: u16,
    pub next_state: NextState,
}

impl Encode for Handshake {
    fn encode<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        write_varint(buf, self.protocol_version);
        write_string(buf, &self.server_address)?;
        buf.put_u16(self.server_port);
        write_varint(buf, self.next_state.as_i32());
        Ok(())
    }
}

impl Decode for Handshake {
    /// Fails with [`ServerError::InvalidNextState`] when `next_state` is
    /// neither status (1) nor login (2).
    fn decode<B: Buf>(buf: &mut B) -> Result<Self> {
        let protocol_version = read_varint(buf)?;
        let server_address = read_string(buf)?;
        let server_port = read_u16(buf)?;
        let raw = read_varint(buf)?;
        let next_state = NextState::from_i32(raw).ok_or(ServerError::InvalidNextState(raw))?;
        Ok(Self {
            protocol_version,
            server_address,
            server_port,
            next_state,
        })
    }
}

//=== Status ===//

/// Server list response: one string holding a JSON document
///
/// The JSON is opaque here; see [`crate::status`] for building it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusResponse {
    pub json: String,
}

impl Encode for StatusResponse {
    fn encode<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        write_string(buf, &self.json)
    }
}

impl Decode for StatusResponse {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self> {
        Ok(Self {
            json: read_string(buf)?,
        })
    }
}

//=== Login ===//

/// # Packet Format
/// ```text
/// {String name}{UUID uuid}
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginStart {
    pub name: String,
    pub uuid: Uuid,
}

impl Encode for LoginStart {
    fn encode<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        write_string(buf, &self.name)?;
        write_uuid(buf, &self.uuid);
        Ok(())
    }
}

impl Decode for LoginStart {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self> {
        let name = read_string(buf)?;
        let uuid = read_uuid(buf)?;
        Ok(Self { name, uuid })
    }
}

/// Profile property attached to a login (e.g. `textures`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub value: String,
    /// Present only for signed properties
    pub signature: Option<String>,
}

impl Encode for Property {
    fn encode<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        write_string(buf, &self.name)?;
        write_string(buf, &self.value)?;
        write_bool(buf, self.signature.is_some());
        if let Some(signature) = &self.signature {
            write_string(buf, signature)?;
        }
        Ok(())
    }
}

impl Decode for Property {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self> {
        let name = read_string(buf)?;
        let value = read_string(buf)?;
        let signature = if read_bool(buf)? {
            Some(read_string(buf)?)
        } else {
            None
        };
        Ok(Self {
            name,
            value,
            signature,
        })
    }
}

/// # Packet Format
/// ```text
/// {UUID uuid}{String username}{VarInt property_count}{Property[]}{bool strict_error_handling}
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSuccess {
    pub uuid: Uuid,
    pub username: String,
    pub property_count: i32,
    pub properties: Vec<Property>,
    pub strict_error_handling: bool,
}

impl LoginSuccess {
    pub fn new(uuid: Uuid, username: impl Into<String>, properties: Vec<Property>) -> Self {
        Self {
            uuid,
            username: username.into(),
            property_count: properties.len() as i32,
            properties,
            strict_error_handling: false,
        }
    }
}

impl Encode for LoginSuccess {
    fn encode<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        check_count("properties", self.property_count, self.properties.len())?;

        write_uuid(buf, &self.uuid);
        write_string(buf, &self.username)?;
        write_varint(buf, self.property_count);
        for property in &self.properties {
            property.encode(buf)?;
        }
        write_bool(buf, self.strict_error_handling);
        Ok(())
    }
}

impl Decode for LoginSuccess {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self> {
        let uuid = read_uuid(buf)?;
        let username = read_string(buf)?;
        let count = read_count(buf, "properties")?;
        let mut properties = Vec::with_capacity(count.min(16));
        for _ in 0..count {
            properties.push(Property::decode(buf)?);
        }
        let strict_error_handling = read_bool(buf)?;
        Ok(Self {
            uuid,
            username,
            property_count: count as i32,
            properties,
            strict_error_handling,
        })
    }
}

/// Login-state disconnect; `reason` is a JSON text component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disconnect {
    pub reason: String,
}

impl Disconnect {
    /// Wrap plain text as `{"text": ...}`
    pub fn from_text(text: &str) -> Self {
        Self {
            reason: serde_json::json!({ "text": text }).to_string(),
        }
    }
}

impl Encode for Disconnect {
    fn encode<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        write_string(buf, &self.reason)
    }
}

impl Decode for Disconnect {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self> {
        Ok(Self {
            reason: read_string(buf)?,
        })
    }
}

//=== Configuration ===//

/// Data pack identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownPack {
    pub namespace: String,
    pub id: String,
    pub version: String,
}

impl KnownPack {
    pub fn new(namespace: impl Into<String>, id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            id: id.into(),
            version: version.into(),
        }
    }
}

/// Known packs list, sent by both sides during configuration
///
/// # Packet Format
/// ```text
/// {VarInt pack_count}{String namespace, String id, String version}[]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownPacks {
    pub pack_count: i32,
    pub packs: Vec<KnownPack>,
}

impl KnownPacks {
    pub fn new(packs: Vec<KnownPack>) -> Self {
        Self {
            pack_count: packs.len() as i32,
            packs,
        }
    }
}

impl Encode for KnownPacks {
    fn encode<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        check_count("known packs", self.pack_count, self.packs.len())?;

        write_varint(buf, self.pack_count);
        for pack in &self.packs {
            write_string(buf, &pack.namespace)?;
            write_string(buf, &pack.id)?;
            write_string(buf, &pack.version)?;
        }
        Ok(())
    }
}

impl Decode for KnownPacks {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self> {
        let count = read_count(buf, "known packs")?;
        let mut packs = Vec::with_capacity(count.min(16));
        for _ in 0..count {
            let namespace = read_string(buf)?;
            let id = read_string(buf)?;
            let version = read_string(buf)?;
            packs.push(KnownPack {
                namespace,
                id,
                version,
            });
        }
        Ok(Self {
            pack_count: count as i32,
            packs,
        })
    }
}

/// Client settings sent at the start of configuration
///
/// # Packet Format
/// ```text
/// {String locale}{i8 view_distance}{VarInt chat_mode}{bool chat_colors}
/// {u8 displayed_skin_parts}{VarInt main_hand}{bool enable_text_filtering}
/// {bool allow_server_listings}
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInformation {
    pub locale: String,
    pub view_distance: i8,
    pub chat_mode: i32,
    pub chat_colors: bool,
    /// Bit mask of visible skin layers
    pub displayed_skin_parts: u8,
    /// 0 = left, 1 = right
    pub main_hand: i32,
    pub enable_text_filtering: bool,
    pub allow_server_listings: bool,
}

impl Encode for ClientInformation {
    fn encode<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        write_string(buf, &self.locale)?;
        buf.put_i8(self.view_distance);
        write_varint(buf, self.chat_mode);
        write_bool(buf, self.chat_colors);
        buf.put_u8(self.displayed_skin_parts);
        write_varint(buf, self.main_hand);
        write_bool(buf, self.enable_text_filtering);
        write_bool(buf, self.allow_server_listings);
        Ok(())
    }
}

impl Decode for ClientInformation {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self> {
        Ok(Self {
            locale: read_string(buf)?,
            view_distance: read_i8(buf)?,
            chat_mode: read_varint(buf)?,
            chat_colors: read_bool(buf)?,
            displayed_skin_parts: read_u8(buf)?,
            main_hand: read_varint(buf)?,
            enable_text_filtering: read_bool(buf)?,
            allow_server_listings: read_bool(buf)?,
        })
    }
}

/// Enabled feature flags
///
/// # Packet Format
/// ```text
/// {VarInt flag_count}{String flag}[]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureFlags {
    pub flag_count: i32,
    pub flags: Vec<String>,
}

impl FeatureFlags {
    pub fn new(flags: Vec<String>) -> Self {
        Self {
            flag_count: flags.len() as i32,
            flags,
        }
    }
}

impl Encode for FeatureFlags {
    fn encode<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        check_count("feature flags", self.flag_count, self.flags.len())?;

        write_varint(buf, self.flag_count);
        for flag in &self.flags {
            write_string(buf, flag)?;
        }
        Ok(())
    }
}

impl Decode for FeatureFlags {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self> {
        let count = read_count(buf, "feature flags")?;
        let mut flags = Vec::with_capacity(count.min(16));
        for _ in 0..count {
            flags.push(read_string(buf)?);
        }
        Ok(Self {
            flag_count: count as i32,
            flags,
        })
    }
}

/// Custom payload on a namespaced channel (e.g. `minecraft:brand`)
///
/// `data` runs to the end of the frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginMessage {
    pub channel: String,
    pub data: Vec<u8>,
}

impl Encode for PluginMessage {
    fn encode<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        write_string(buf, &self.channel)?;
        buf.put_slice(&self.data);
        Ok(())
    }
}

impl Decode for PluginMessage {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self> {
        let channel = read_string(buf)?;
        let data = buf.copy_to_bytes(buf.remaining()).to_vec();
        Ok(Self { channel, data })
    }
}

//=== Play ===//

/// Where the player last died
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeathLocation {
    pub dimension_name: String,
    pub position: BlockPosition,
}

/// Initial play packet establishing the client's world context
///
/// # Packet Format
/// ```text
/// {i32 entity_id}{bool is_hardcore}{VarInt dimension_count}{String dimension}[]
/// {VarInt max_players}{VarInt view_distance}{VarInt simulation_distance}
/// {bool reduced_debug_info}{bool enable_respawn_screen}{bool do_limited_crafting}
/// {VarInt dimension_type}{String dimension_name}{i64 hashed_seed}
/// {u8 game_mode}{i8 previous_game_mode}{bool is_debug}{bool is_flat}
/// {bool has_death_location}[{String death_dimension}{Position death_location}]
/// {VarInt portal_cooldown}{bool enforces_secure_chat}
/// ```
///
/// The death location fields are present only when `has_death_location` is true.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginPlay {
    pub entity_id: i32,
    pub is_hardcore: bool,
    pub dimension_count: i32,
    pub dimension_names: Vec<String>,
    pub max_players: i32,
    pub view_distance: i32,
    pub simulation_distance: i32,
    pub reduced_debug_info: bool,
    pub enable_respawn_screen: bool,
    pub do_limited_crafting: bool,
    pub dimension_type: i32,
    pub dimension_name: String,
    pub hashed_seed: i64,
    pub game_mode: GameMode,
    /// -1 when there is no previous game mode
    pub previous_game_mode: i8,
    pub is_debug: bool,
    pub is_flat: bool,
    pub death_location: Option<DeathLocation>,
    pub portal_cooldown: i32,
    pub enforces_secure_chat: bool,
}

impl Encode for LoginPlay {
    fn encode<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        check_count("dimensions", self.dimension_count, self.dimension_names.len())?;

        buf.put_i32(self.entity_id);
        write_bool(buf, self.is_hardcore);
        write_varint(buf, self.dimension_count);
        for name in &self.dimension_names {
            write_string(buf, name)?;
        }
        write_varint(buf, self.max_players);
        write_varint(buf, self.view_distance);
        write_varint(buf, self.simulation_distance);
        write_bool(buf, self.reduced_debug_info);
        write_bool(buf, self.enable_respawn_screen);
        write_bool(buf, self.do_limited_crafting);
        write_varint(buf, self.dimension_type);
        write_string(buf, &self.dimension_name)?;
        buf.put_i64(self.hashed_seed);
        buf.put_u8(self.game_mode.as_u8());
        buf.put_i8(self.previous_game_mode);
        write_bool(buf, self.is_debug);
        write_bool(buf, self.is_flat);
        write_bool(buf, self.death_location.is_some());
        if let Some(death) = &self.death_location {
            write_string(buf, &death.dimension_name)?;
            write_position(buf, death.position);
        }
        write_varint(buf, self.portal_cooldown);
        write_bool(buf, self.enforces_secure_chat);
        Ok(())
    }
}

impl Decode for LoginPlay {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self> {
        let entity_id = read_i32(buf)?;
        let is_hardcore = read_bool(buf)?;
        let count = read_count(buf, "dimensions")?;
        let mut dimension_names = Vec::with_capacity(count.min(16));
        for _ in 0..count {
            dimension_names.push(read_string(buf)?);
        }
        let max_players = read_varint(buf)?;
        let view_distance = read_varint(buf)?;
        let simulation_distance = read_varint(buf)?;
        let reduced_debug_info = read_bool(buf)?;
        let enable_respawn_screen = read_bool(buf)?;
        let do_limited_crafting = read_bool(buf)?;
        let dimension_type = read_varint(buf)?;
        let dimension_name = read_string(buf)?;
        let hashed_seed = read_i64(buf)?;
        let raw_mode = read_u8(buf)?;
        let game_mode = GameMode::from_u8(raw_mode)
            .ok_or_else(|| ServerError::InvalidData(format!("Unknown game mode: {}", raw_mode)))?;
        let previous_game_mode = read_i8(buf)?;
        let is_debug = read_bool(buf)?;
        let is_flat = read_bool(buf)?;
        let death_location = if read_bool(buf)? {
            let dimension_name = read_string(buf)?;
            let position = read_position(buf)?;
            Some(DeathLocation {
                dimension_name,
                position,
            })
        } else {
            None
        };
        let portal_cooldown = read_varint(buf)?;
        let enforces_secure_chat = read_bool(buf)?;

        Ok(Self {
            entity_id,
            is_hardcore,
            dimension_count: count as i32,
            dimension_names,
            max_players,
            view_distance,
            simulation_distance,
            reduced_debug_info,
            enable_respawn_screen,
            do_limited_crafting,
            dimension_type,
            dimension_name,
            hashed_seed,
            game_mode,
            previous_game_mode,
            is_debug,
            is_flat,
            death_location,
            portal_cooldown,
            enforces_secure_chat,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    fn encoded<P: Encode>(packet: &P) -> BytesMut {
        let mut buf = BytesMut::new();
        packet.encode(&mut buf).unwrap();
        buf
    }

    fn sample_login_play() -> LoginPlay {
        LoginPlay {
            entity_id: 42,
            is_hardcore: false,
            dimension_count: 1,
            dimension_names: vec!["minecraft:overworld".into()],
            max_players: 20,
            view_distance: 10,
            simulation_distance: 8,
            reduced_debug_info: false,
            enable_respawn_screen: true,
            do_limited_crafting: false,
            dimension_type: 0,
            dimension_name: "minecraft:overworld".into(),
            hashed_seed: -7_531_246_891,
            game_mode: GameMode::Creative,
            previous_game_mode: -1,
            is_debug: false,
            is_flat: true,
            death_location: None,
            portal_cooldown: 0,
            enforces_secure_chat: false,
        }
    }

    #[test]
    fn test_handshake_layout() {
        let handshake = Handshake {
            protocol_version: 769,
            server_address: "localhost".into(),
            server_port: 25565,
            next_state: NextState::Login,
        };
        let buf = encoded(&handshake);

        let mut expected = encode_varint(769);
        expected.push(9);
        expected.extend_from_slice(b"localhost");
        expected.extend_from_slice(&[0x63, 0xDD, 0x02]);
        assert_eq!(&buf[..], &expected[..]);

        assert_eq!(Handshake::decode(&mut &buf[..]).unwrap(), handshake);
    }

    #[test]
    fn test_handshake_rejects_unknown_next_state() {
        let mut buf = BytesMut::new();
        write_varint(&mut buf, 769);
        write_string(&mut buf, "localhost").unwrap();
        buf.put_u16(25565);
        write_varint(&mut buf, 3);

        let err = Handshake::decode(&mut &buf[..]).unwrap_err();
        assert!(matches!(err, ServerError::InvalidNextState(3)));
    }

    #[test]
    fn test_handshake_truncated() {
        let mut buf = BytesMut::new();
        write_varint(&mut buf, 769);
        write_string(&mut buf, "localhost").unwrap();
        buf.put_u8(0x63);

        let err = Handshake::decode(&mut &buf[..]).unwrap_err();
        assert!(matches!(err, ServerError::UnexpectedEof { needed: 2, remaining: 1 }));
    }

    #[test]
    fn test_login_start_uuid_is_raw() {
        let uuid = Uuid::from_u128(0x0011_2233_4455_6677_8899_AABB_CCDD_EEFF);
        let packet = LoginStart {
            name: "Steve".into(),
            uuid,
        };
        let buf = encoded(&packet);
        assert_eq!(buf.len(), 1 + 5 + 16);
        assert_eq!(&buf[6..], uuid.as_bytes());
        assert_eq!(LoginStart::decode(&mut &buf[..]).unwrap(), packet);
    }

    #[test]
    fn test_login_success_layout() {
        let uuid = Uuid::from_u128(1);
        let packet = LoginSuccess::new(
            uuid,
            "Alex",
            vec![
                Property {
                    name: "textures".into(),
                    value: "abc".into(),
                    signature: Some("sig".into()),
                },
                Property {
                    name: "other".into(),
                    value: "x".into(),
                    signature: None,
                },
            ],
        );
        let buf = encoded(&packet);

        assert_eq!(&buf[..16], uuid.as_bytes());
        assert_eq!(&buf[16..21], b"\x04Alex");
        assert_eq!(buf[21], 2);
        // strict_error_handling closes the packet
        assert_eq!(buf[buf.len() - 1], 0x00);

        let decoded = LoginSuccess::decode(&mut &buf[..]).unwrap();
        assert_eq!(decoded, packet);
        assert_eq!(decoded.properties[0].signature.as_deref(), Some("sig"));
        assert_eq!(decoded.properties[1].signature, None);
    }

    #[test]
    fn test_count_mismatch_writes_nothing() {
        let mut login = LoginSuccess::new(Uuid::nil(), "Alex", vec![]);
        login.property_count = 1;

        let mut packs = KnownPacks::new(vec![KnownPack::new("minecraft", "core", "1.21")]);
        packs.pack_count = 2;

        let mut flags = FeatureFlags::new(vec!["minecraft:vanilla".into()]);
        flags.flag_count = 0;

        let mut play = sample_login_play();
        play.dimension_count = -1;

        let mut buf = BytesMut::new();
        assert!(matches!(
            login.encode(&mut buf),
            Err(ServerError::CountMismatch { field: "properties", declared: 1, actual: 0 })
        ));
        assert!(matches!(
            packs.encode(&mut buf),
            Err(ServerError::CountMismatch { declared: 2, actual: 1, .. })
        ));
        assert!(matches!(
            flags.encode(&mut buf),
            Err(ServerError::CountMismatch { declared: 0, actual: 1, .. })
        ));
        assert!(matches!(
            play.encode(&mut buf),
            Err(ServerError::CountMismatch { declared: -1, .. })
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_known_packs_roundtrip() {
        let packs = KnownPacks::new(vec![
            KnownPack::new("minecraft:core", "0", "1.21"),
            KnownPack::new("custom", "pack", "2"),
        ]);
        let buf = encoded(&packs);
        assert_eq!(buf[0], 2);
        assert_eq!(KnownPacks::decode(&mut &buf[..]).unwrap(), packs);
    }

    #[test]
    fn test_known_packs_negative_count() {
        let buf = encode_varint(-1);
        assert!(matches!(
            KnownPacks::decode(&mut &buf[..]),
            Err(ServerError::InvalidData(_))
        ));
    }

    #[test]
    fn test_known_packs_count_exceeds_data() {
        // Claims 1000 packs but carries none
        let buf = encode_varint(1000);
        assert!(matches!(
            KnownPacks::decode(&mut &buf[..]),
            Err(ServerError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_client_information_fields() {
        let info = ClientInformation {
            locale: "en_us".into(),
            view_distance: 12,
            chat_mode: 0,
            chat_colors: true,
            displayed_skin_parts: 0x7F,
            main_hand: 1,
            enable_text_filtering: false,
            allow_server_listings: true,
        };
        let buf = encoded(&info);
        assert_eq!(&buf[..], b"\x05en_us\x0c\x00\x01\x7f\x01\x00\x01");
        assert_eq!(ClientInformation::decode(&mut &buf[..]).unwrap(), info);
    }

    #[test]
    fn test_empty_feature_flags() {
        let buf = encoded(&FeatureFlags::default());
        assert_eq!(&buf[..], &[0x00]);
    }

    #[test]
    fn test_login_play_without_death_location() {
        let play = sample_login_play();
        let buf = encoded(&play);

        // death flag, portal cooldown, secure chat
        assert_eq!(&buf[buf.len() - 3..], &[0x00, 0x00, 0x00]);
        assert_eq!(LoginPlay::decode(&mut &buf[..]).unwrap(), play);
    }

    #[test]
    fn test_login_play_with_death_location() {
        let mut play = sample_login_play();
        let without = encoded(&play).len();

        let position = BlockPosition::new(-120, 64, 3000);
        play.death_location = Some(DeathLocation {
            dimension_name: "minecraft:the_nether".into(),
            position,
        });
        let buf = encoded(&play);

        // name (1 + 20) + packed position (8)
        assert_eq!(buf.len(), without + 21 + 8);
        let tail = &buf[buf.len() - 10..buf.len() - 2];
        assert_eq!(tail, &position.pack().to_be_bytes());

        let decoded = LoginPlay::decode(&mut &buf[..]).unwrap();
        assert_eq!(decoded.death_location.unwrap().position, position);
    }

    #[test]
    fn test_login_play_unknown_game_mode() {
        let play = sample_login_play();
        let mut buf = encoded(&play);
        // entity(4) hardcore(1) count(1) name(20) max(1) view(1) sim(1) flags(3)
        // type(1) name(20) seed(8)
        let mode_at = 4 + 1 + 1 + 20 + 1 + 1 + 1 + 3 + 1 + 20 + 8;
        assert_eq!(buf[mode_at], GameMode::Creative.as_u8());
        buf[mode_at] = 9;
        assert!(matches!(
            LoginPlay::decode(&mut &buf[..]),
            Err(ServerError::InvalidData(_))
        ));
    }

    #[test]
    fn test_plugin_message_takes_rest_of_frame() {
        let message = PluginMessage {
            channel: "minecraft:brand".into(),
            data: b"\x07vanilla".to_vec(),
        };
        let buf = encoded(&message);
        assert_eq!(PluginMessage::decode(&mut &buf[..]).unwrap(), message);
    }

    #[test]
    fn test_packet_with_data_is_verbatim() {
        let payload = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        let packet = PacketWithData::decode(&mut &payload[..]).unwrap();
        assert_eq!(packet.data, payload);
        assert_eq!(&encoded(&packet)[..], &payload);
    }

    #[test]
    fn test_disconnect_text_component() {
        let packet = Disconnect::from_text("Bad \"packet\"");
        let json: serde_json::Value = serde_json::from_str(&packet.reason).unwrap();
        assert_eq!(json["text"], "Bad \"packet\"");

        let buf = encoded(&packet);
        assert_eq!(Disconnect::decode(&mut &buf[..]).unwrap(), packet);
    }
}
