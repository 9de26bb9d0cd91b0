//! Skybox: cube-map background

use super::{AttachContext, Element, ElementError, ElementKind};
use crate::scene::Background;
use crate::skybox::{SkyboxSpec, load_cube_map};

pub(super) fn attach(spec: &SkyboxSpec, ctx: &mut AttachContext<'_>) -> Result<Element, ElementError> {
    let faces = spec.faces()?;
    let data = load_cube_map(&faces, ctx.base_dir)?;
    let handle = ctx.cube_maps.add(data);
    ctx.scene.set_background(Some(Background::CubeMap(handle)));
    Ok(Element::new(ElementKind::Skybox, "skybox", None).with_cube_map(handle))
}
