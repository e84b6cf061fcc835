// Scene composition - turns a session into the sprite list the renderer draws

use glam::{Vec2, Vec3, Vec4};

use super::session::GameSession;
use crate::engine::assets::AssetId;
use crate::engine::renderer::Sprite;

pub const PLAYER_WIDTH: f32 = 1.0;
pub const OBSTACLE_WIDTH: f32 = 1.0;
pub const COIN_WIDTH: f32 = 0.6;
pub const ROAD_WIDTH: f32 = 4.5;
pub const ROAD_TILE_LENGTH: f32 = 10.0;
/// Road drawn this far ahead of the player
pub const ROAD_AHEAD: f32 = 60.0;
/// Camera offset from the player
pub const CAMERA_OFFSET: Vec3 = Vec3::new(0.0, 2.0, 5.0);

const BACKGROUND_LAYER: i32 = -10;
const ROAD_LAYER: i32 = -1;
const ACTOR_LAYER: i32 = 0;
const OVERLAY_LAYER: i32 = 10;

const GAME_OVER_TINT: Vec4 = Vec4::new(1.0, 0.0, 0.0, 0.35);
const LIGHT_SKY: [f64; 4] = [0.53, 0.81, 0.92, 1.0];
const DARK_SKY: [f64; 4] = [0.04, 0.04, 0.08, 1.0];

/// Clear color behind everything
pub fn clear_color(dark_mode: bool) -> [f64; 4] {
    if dark_mode {
        DARK_SKY
    } else {
        LIGHT_SKY
    }
}

/// Static parts of the scene
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Backdrop {
    pub road: Option<AssetId>,
    pub theme: Option<AssetId>,
}

/// Build the sprites for one frame. `dimensions` reports a texture's pixel
/// size once it has loaded.
pub fn compose<F>(session: &GameSession, backdrop: Backdrop, dimensions: F) -> Vec<Sprite>
where
    F: Fn(AssetId) -> Option<(u32, u32)>,
{
    let mut sprites = Vec::new();

    if let Some(theme) = backdrop.theme {
        sprites.push(
            Sprite::screen()
                .with_texture(theme)
                .with_layer(BACKGROUND_LAYER),
        );
    }

    let Some(player) = session.player() else {
        return sprites;
    };
    let player_z = player.position.z;

    if let Some(road) = backdrop.road {
        push_road(&mut sprites, road, player_z, session.tuning().despawn_distance);
    }

    // Player, sampling the current sheet frame when animated
    let texture = dimensions(player.visual);
    let (uv, aspect) = match (player.sheet, texture) {
        (Some(sheet), Some((w, h))) => (
            sheet.frame_uvs(player.animation.current_frame(), w, h),
            sheet.frame_height as f32 / sheet.frame_width as f32,
        ),
        (None, Some((w, h))) => (Sprite::FULL_UV, h as f32 / w.max(1) as f32),
        _ => (Sprite::FULL_UV, 1.0),
    };
    let size = Vec2::new(PLAYER_WIDTH, PLAYER_WIDTH * aspect);
    sprites.push(
        Sprite::billboard(player.position + Vec3::Y * size.y * 0.5, size)
            .with_texture(player.visual)
            .with_uv(uv)
            .with_layer(ACTOR_LAYER),
    );

    for obstacle in session.obstacles() {
        let size = sized(OBSTACLE_WIDTH, dimensions(obstacle.visual));
        sprites.push(
            Sprite::billboard(obstacle.position + Vec3::Y * size.y * 0.5, size)
                .with_texture(obstacle.visual)
                .with_layer(ACTOR_LAYER),
        );
    }

    for coin in session.coins() {
        let mut size = sized(COIN_WIDTH, dimensions(coin.visual));
        // Spin reads as the coin narrowing edge-on
        size.x *= coin.rotation.cos().abs().max(0.1);
        sprites.push(
            Sprite::billboard(coin.position, size)
                .with_texture(coin.visual)
                .with_layer(ACTOR_LAYER),
        );
    }

    if session.is_game_over() {
        sprites.push(
            Sprite::screen()
                .with_color(GAME_OVER_TINT)
                .with_layer(OVERLAY_LAYER),
        );
    }

    sprites
}

fn sized(width: f32, dimensions: Option<(u32, u32)>) -> Vec2 {
    let aspect = dimensions.map_or(1.0, |(w, h)| h as f32 / w.max(1) as f32);
    Vec2::new(width, width * aspect)
}

/// Tiles aligned to a fixed grid so the road scrolls with the world
fn push_road(sprites: &mut Vec<Sprite>, road: AssetId, player_z: f32, behind: f32) {
    let first = ((player_z + behind) / ROAD_TILE_LENGTH).ceil() as i64;
    let last = ((player_z - ROAD_AHEAD) / ROAD_TILE_LENGTH).floor() as i64;

    for tile in (last..=first).rev() {
        let center_z = (tile as f32 - 0.5) * ROAD_TILE_LENGTH;
        sprites.push(
            Sprite::ground(
                Vec3::new(0.0, 0.0, center_z),
                Vec2::new(ROAD_WIDTH, ROAD_TILE_LENGTH),
            )
            .with_texture(road)
            .with_layer(ROAD_LAYER),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::input::Intents;
    use crate::engine::renderer::sprite::Facing;
    use crate::game::entity::EntityKind;
    use crate::game::tuning::BASE_TUNING;

    fn session() -> GameSession {
        let mut session = GameSession::new(BASE_TUNING);
        session.place_player(AssetId::from_path("player1.png"), None);
        session.start();
        session
    }

    fn square(_: AssetId) -> Option<(u32, u32)> {
        Some((64, 64))
    }

    fn backdrop() -> Backdrop {
        Backdrop {
            road: Some(AssetId::from_path("road.png")),
            theme: Some(AssetId::from_path("jungle.jpg")),
        }
    }

    #[test]
    fn test_idle_session_draws_only_backdrop() {
        let session = GameSession::new(BASE_TUNING);
        let sprites = compose(&session, backdrop(), square);
        assert_eq!(sprites.len(), 1);
        assert_eq!(sprites[0].facing, Facing::Screen);
    }

    #[test]
    fn test_player_stands_on_track() {
        let session = session();
        let sprites = compose(&session, Backdrop::default(), |_| Some((32, 64)));
        let player = &sprites[0];

        assert_eq!(player.facing, Facing::Billboard);
        assert_eq!(player.size, Vec2::new(1.0, 2.0));
        assert_eq!(player.position, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_road_covers_view_around_player() {
        let session = session();
        let sprites = compose(&session, backdrop(), square);
        let road: Vec<&Sprite> = sprites
            .iter()
            .filter(|s| s.facing == Facing::Ground)
            .collect();

        let nearest = road.iter().map(|s| s.position.z + 5.0).fold(f32::MIN, f32::max);
        let farthest = road.iter().map(|s| s.position.z - 5.0).fold(f32::MAX, f32::min);
        assert!(nearest >= 10.0);
        assert!(farthest <= -60.0);
    }

    #[test]
    fn test_entities_are_drawn() {
        let mut session = session();
        session.spawn(EntityKind::Obstacle, 1.5, AssetId::from_path("obstacle.png"));
        session.spawn(EntityKind::Coin, -1.5, AssetId::from_path("coin.png"));

        let sprites = compose(&session, Backdrop::default(), square);
        assert_eq!(sprites.len(), 3);

        let obstacle = &sprites[1];
        assert_eq!(obstacle.position, Vec3::new(1.5, 0.5, -20.0));
        let coin = &sprites[2];
        assert_eq!(coin.position, Vec3::new(-1.5, 0.5, -20.0));
        assert_eq!(coin.size, Vec2::new(COIN_WIDTH, COIN_WIDTH));
    }

    #[test]
    fn test_spinning_coin_narrows() {
        let mut session = session();
        session.spawn(EntityKind::Coin, 1.5, AssetId::from_path("coin.png"));
        for _ in 0..10 {
            session.step(&Intents::default(), 1.0 / 60.0);
        }
        let sprites = compose(&session, Backdrop::default(), square);
        assert!(sprites[1].size.x < COIN_WIDTH);
    }

    #[test]
    fn test_game_over_adds_overlay() {
        let mut session = session();
        session.spawn(EntityKind::Obstacle, 0.0, AssetId::from_path("obstacle.png"));
        while !session.step(&Intents::default(), 1.0 / 60.0).game_over {}

        let sprites = compose(&session, Backdrop::default(), square);
        let overlay = sprites.last().unwrap();
        assert_eq!(overlay.facing, Facing::Screen);
        assert_eq!(overlay.color, GAME_OVER_TINT);
        assert_eq!(overlay.texture, None);
    }

    #[test]
    fn test_dark_mode_darkens_sky() {
        let light = clear_color(false);
        let dark = clear_color(true);
        assert!(dark[0] + dark[1] + dark[2] < light[0] + light[1] + light[2]);
    }
}
