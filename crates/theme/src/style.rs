use crate::Theme;
use frame_core::Part;
use std::fmt::Write;

/// Root class shared by every loader widget.
pub const WIDGET_CLASS: &str = "frame-widget";

/// Stylesheet for the widget visual contract.
///
/// Only layout and colours live here; visibility is always driven by the
/// `hidden` attribute each host sets from the widget's `View`.
pub fn stylesheet(theme: &Theme) -> String {
    let mut css = String::new();
    let id = |part: Part| part.element_id();

    let _ = write!(
        css,
        "body{{background:{bg};color:{fg};font-family:{font};}}\n\
         .{root}{{position:relative;display:block;margin:3rem auto;overflow:hidden;\
         outline:0.125rem solid {outline};border-radius:{radius}rem;}}\n\
         .{root} [hidden]{{display:none !important;}}\n",
        root = WIDGET_CLASS,
        bg = theme.background,
        fg = theme.foreground,
        font = theme.font,
        outline = theme.outline,
        radius = theme.border_radius,
    );

    let _ = write!(
        css,
        ".{root} .{cover}{{display:block;width:100%;}}\n\
         .{root} .{surface}{{display:block;width:100%;border:none;}}\n",
        root = WIDGET_CLASS,
        cover = id(Part::Cover),
        surface = id(Part::Surface),
    );

    let _ = write!(
        css,
        ".{root} .{load}{{position:absolute;top:50%;left:50%;transform:translate(-50%,-50%);\
         font-size:{size}rem;font-weight:600;padding:1rem 2rem;border:none;\
         border-radius:{radius}rem;cursor:pointer;background:{accent};color:{fg};\
         box-shadow:-1rem 1rem 3rem 0 #000;}}\n\
         .{root} .{load}:hover{{background:{hover};}}\n",
        root = WIDGET_CLASS,
        load = id(Part::LoadControl),
        size = theme.control_size,
        radius = theme.border_radius,
        accent = theme.accent,
        hover = theme.accent_hover,
        fg = theme.foreground,
    );

    let _ = write!(
        css,
        ".{root} .{busy}{{display:flex;align-items:center;justify-content:center;\
         background:{busy_bg};color:{fg};font-size:2rem;}}\n\
         .{root} .{busy}::before{{content:\"\";width:34px;height:34px;margin-right:1rem;\
         border:5px solid {fg};border-right-color:transparent;border-bottom-color:transparent;\
         border-radius:50%;animation:frame-spin 1s linear infinite;}}\n\
         @keyframes frame-spin{{0%{{transform:rotate(0deg);}}100%{{transform:rotate(360deg);}}}}\n",
        root = WIDGET_CLASS,
        busy = id(Part::BusyIndicator),
        busy_bg = theme.busy_background,
        fg = theme.foreground,
    );

    let _ = write!(
        css,
        ".{root} .{error}{{padding:2rem;text-align:center;color:{err};}}\n\
         .{root} .{fs}{{position:absolute;right:0.5rem;bottom:0.5rem;z-index:100;\
         background:none;border:none;cursor:pointer;color:{fg};font-size:1.5rem;}}\n",
        root = WIDGET_CLASS,
        error = id(Part::ErrorMessage),
        err = theme.error,
        fs = id(Part::FullscreenControl),
        fg = theme.foreground,
    );

    css
}
