use crate::config::Config;

/// ASCII structured points header, samples follow on the next line
pub fn generate_header(cfg: &Config) -> String {
    let (d, s) = (cfg.dims, cfg.spacing);
    format!(
        "# vtk DataFile Version 3.0\n\
         vol_gen {:?}\n\
         ASCII\n\
         DATASET STRUCTURED_POINTS\n\
         DIMENSIONS {} {} {}\n\
         SPACING {} {} {}\n\
         ORIGIN 0 0 0\n\
         POINT_DATA {}\n\
         SCALARS scalars unsigned_char 1\n\
         LOOKUP_TABLE default\n",
        cfg.generator,
        d.x,
        d.y,
        d.z,
        s.x,
        s.y,
        s.z,
        cfg.voxel_count()
    )
}
