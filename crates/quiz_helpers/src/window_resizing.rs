// wgpu surfaces reject dimensions above the maximum texture size
#[cfg(target_arch = "wasm32")]
const MAX_SURFACE_EXTENT: f32 = 2048.0;

#[cfg(target_arch = "wasm32")]
pub fn fit_window_to_browser(
    mut primary_query: bevy::ecs::system::Query<
        &mut bevy::window::Window,
        bevy::ecs::query::With<bevy::window::PrimaryWindow>,
    >,
) {
    let Some(browser) = web_sys::window() else {
        return;
    };
    let Some(target_width) = browser.inner_width().ok().and_then(|v| v.as_f64()) else {
        return;
    };
    let Some(target_height) = browser.inner_height().ok().and_then(|v| v.as_f64()) else {
        return;
    };
    let target_width = (target_width as f32).min(MAX_SURFACE_EXTENT);
    let target_height = (target_height as f32).min(MAX_SURFACE_EXTENT);

    for mut window in &mut primary_query {
        if (window.resolution.width() - target_width).abs() > f32::EPSILON
            || (window.resolution.height() - target_height).abs() > f32::EPSILON
        {
            window.resolution.set(target_width, target_height);
        }
    }
}
