//! Light rig applied once per scene

use crate::config::{parse_color, LightsConfig};
use siteview_scene::{Light, Scene3D, ShadowSettings, Vec3};

/// Id of the key light
pub const DIRECTIONAL_LIGHT_ID: &str = "directional";
/// Id of the fill light
pub const AMBIENT_LIGHT_ID: &str = "ambient";

/// Add a shadow-casting directional light and an ambient fill light to `scene`
pub fn setup_lights(scene: &mut Scene3D, config: &LightsConfig) {
    let directional = Light::new_directional(
        DIRECTIONAL_LIGHT_ID.to_string(),
        Vec3::from_array(config.directional_position),
        parse_color(&config.directional_color, "#ffffff"),
        config.directional_intensity,
    )
    .with_shadow(ShadowSettings {
        map_width: config.shadow_map_size,
        map_height: config.shadow_map_size,
        near: config.shadow_near,
        far: config.shadow_far,
    });
    scene.add_light(directional);

    scene.add_light(Light::new_ambient(
        AMBIENT_LIGHT_ID.to_string(),
        parse_color(&config.ambient_color, "#ffffff"),
        config.ambient_intensity,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use siteview_scene::{Color, LightType};

    #[test]
    fn test_default_rig() {
        let mut scene = Scene3D::default();
        setup_lights(&mut scene, &LightsConfig::default());

        assert_eq!(scene.lights.len(), 2);
        let key = &scene.lights[0];
        assert!(key.casts_shadows());
        let shadow = key.shadow.unwrap();
        assert_eq!((shadow.map_width, shadow.map_height), (2048, 2048));
        assert_eq!((shadow.near, shadow.far), (0.5, 50.0));
        assert!(matches!(
            key.light_type,
            LightType::Directional { position, .. } if position == Vec3::new(5.0, 10.0, 15.0)
        ));

        let fill = &scene.lights[1];
        assert!(!fill.casts_shadows());
        assert_eq!(
            fill.light_type,
            LightType::Ambient {
                color: Color::WHITE,
                intensity: 1.5
            }
        );
    }
}
