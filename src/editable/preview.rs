use crate::host::{ObjectHandle, ProxyHandle, ProxyShape, ProxyTransform, SceneHost};
use glam::{Vec3, Vec4};

pub const PREVIEW_COLOR: Vec3 = Vec3::new(1.0, 0.0, 0.0);
pub const HIGHLIGHT_COLOR: Vec3 = Vec3::new(0.0, 0.6, 1.0);

pub const OPACITY_MIN: f32 = 0.1;
pub const OPACITY_MAX: f32 = 1.0;

/// Maps a raw slider value in `[0, 1]` onto `[lower, upper]` geometrically, so
/// small raw values get finer control. `scale(0) = lower`, `scale(1) = upper`.
pub fn exponential_scale(value: f32, lower: f32, upper: f32) -> f32 {
    let t = value.clamp(0.0, 1.0);
    if lower <= 0.0 || upper <= 0.0 {
        return lower + (upper - lower) * t * t;
    }
    lower * (upper / lower).powf(t)
}

/// Presentation settings shared by every preview.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewStyle {
    pub enabled: bool,
    pub xray: bool,
    pub opacity: f32,
    pub selected_opacity: f32,
}

impl Default for PreviewStyle {
    fn default() -> Self {
        Self {
            enabled: false,
            xray: true,
            opacity: exponential_scale(0.001, OPACITY_MIN, OPACITY_MAX),
            selected_opacity: exponential_scale(0.3, OPACITY_MIN, OPACITY_MAX),
        }
    }
}

/// Lazily created proxy plus the style it was last shown with.
#[derive(Debug, Default)]
pub struct PreviewState {
    proxy: Option<ProxyHandle>,
    style: PreviewStyle,
    highlighted: bool,
}

impl PreviewState {
    pub fn proxy(&self) -> Option<ProxyHandle> {
        self.proxy
    }

    pub fn style(&self) -> PreviewStyle {
        self.style
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    pub fn color(&self) -> Vec4 {
        if self.highlighted {
            HIGHLIGHT_COLOR.extend(self.style.selected_opacity)
        } else {
            PREVIEW_COLOR.extend(self.style.opacity)
        }
    }

    /// Creates the proxy on first enable. Disabling only hides it.
    pub fn set_enabled(
        &mut self,
        enabled: bool,
        shape: ProxyShape,
        parent: ObjectHandle,
        transform: &ProxyTransform,
        host: &mut dyn SceneHost,
    ) {
        self.style.enabled = enabled;
        if enabled && self.proxy.is_none() {
            self.proxy = host.create_proxy(shape, parent);
            if let Some(proxy) = self.proxy {
                host.set_proxy_xray(proxy, self.style.xray);
                host.set_proxy_color(proxy, self.color());
                host.set_proxy_transform(proxy, transform);
            }
        }
        if let Some(proxy) = self.proxy {
            host.set_proxy_visible(proxy, enabled);
        }
    }

    pub fn set_xray(&mut self, xray: bool, host: &mut dyn SceneHost) {
        self.style.xray = xray;
        if let Some(proxy) = self.proxy {
            host.set_proxy_xray(proxy, xray);
        }
    }

    pub fn set_opacity(&mut self, alpha: f32, host: &mut dyn SceneHost) {
        self.style.opacity = alpha;
        self.refresh_color(host);
    }

    pub fn set_selected_opacity(&mut self, alpha: f32, host: &mut dyn SceneHost) {
        self.style.selected_opacity = alpha;
        self.refresh_color(host);
    }

    pub fn set_highlighted(&mut self, highlighted: bool, host: &mut dyn SceneHost) {
        self.highlighted = highlighted;
        self.refresh_color(host);
    }

    pub fn update_transform(&self, transform: &ProxyTransform, host: &mut dyn SceneHost) {
        if let Some(proxy) = self.proxy {
            host.set_proxy_transform(proxy, transform);
        }
    }

    pub fn destroy(&mut self, host: &mut dyn SceneHost) {
        if let Some(proxy) = self.proxy.take() {
            host.destroy_proxy(proxy);
        }
    }

    fn refresh_color(&self, host: &mut dyn SceneHost) {
        if let Some(proxy) = self.proxy {
            host.set_proxy_color(proxy, self.color());
        }
    }
}
