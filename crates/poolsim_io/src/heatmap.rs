//! Occupancy heatmaps written as plain-text PPM images.
//!
//! One pixel per world unit. A pixel covered by small particles counts them,
//! saturating at [`BITMAP_MAX`]. A pixel covered by any large particle holds
//! [`LARGE_MARK`] and is drawn blue; everything else is drawn in shades of red.

use crate::error::{IoError, Result};
use poolsim_core::Topology;
use poolsim_data::Particle;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

pub const BITMAP_MAX: u16 = 255;
pub const LARGE_MARK: u16 = BITMAP_MAX + 1;

#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    side: usize,
    rows: Vec<Vec<u16>>,
}

impl Canvas {
    /// Rasterizes world-frame particles onto a `side` × `side` canvas.
    ///
    /// Particles are bucketed by the rows they reach first, so each row only
    /// visits the particles that can touch it.
    #[must_use]
    pub fn from_particles(side: usize, particles: &[Particle]) -> Self {
        let mut spans: Vec<Vec<(&Particle, i64)>> = vec![Vec::new(); side];
        for p in particles {
            let reach = p.radius.ceil() as i64;
            for j in -reach..=reach {
                let y = (p.position.y + j as f64) as i64;
                if let Some(span) = usize::try_from(y).ok().and_then(|y| spans.get_mut(y)) {
                    span.push((p, j));
                }
            }
        }

        let rows = spans
            .into_par_iter()
            .map(|span| {
                let mut row = vec![0u16; side];
                for (p, j) in span {
                    paint_span(&mut row, j, p);
                }
                row
            })
            .collect();
        Self { side, rows }
    }

    /// Rasterizes per-region particles stored in their region frames.
    #[must_use]
    pub fn from_regions(topology: &Topology, regions: &[Vec<Particle>]) -> Self {
        let world: Vec<Particle> = regions
            .iter()
            .flatten()
            .map(|p| {
                let mut p = p.clone();
                p.position = topology.to_world(&p);
                p
            })
            .collect();
        Self::from_particles(topology.world_size() as usize, &world)
    }

    #[must_use]
    pub fn side(&self) -> usize {
        self.side
    }

    /// Value at column `x`, row `y`; zero outside the canvas.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> u16 {
        self.rows
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .unwrap_or(0)
    }
}

/// Marks the pixels of one row covered by `p` at vertical offset `j`: every
/// `x + k` with `j² + k² < r²`, truncated toward zero.
fn paint_span(row: &mut [u16], j: i64, p: &Particle) {
    let reach = p.radius.ceil() as i64;
    let r2 = p.radius * p.radius;
    let side = row.len() as i64;

    for k in -reach..=reach {
        if ((j * j + k * k) as f64) >= r2 {
            continue;
        }
        let x = (p.position.x + k as f64) as i64;
        if x < 0 || x >= side {
            continue;
        }
        let cell = &mut row[x as usize];
        if p.is_large() || *cell > BITMAP_MAX {
            *cell = LARGE_MARK;
        } else {
            *cell = (*cell + 1).min(BITMAP_MAX);
        }
    }
}

/// Plain `P3` encoding of the canvas.
#[must_use]
pub fn encode_ppm(canvas: &Canvas) -> String {
    let body: Vec<String> = canvas
        .rows
        .par_iter()
        .map(|row| {
            row.iter()
                .map(|&v| {
                    if v > BITMAP_MAX {
                        format!("0 0 {BITMAP_MAX}")
                    } else {
                        format!("{v} 0 0")
                    }
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect();

    let mut out = format!("P3\n{0} {0}\n{BITMAP_MAX}\n", canvas.side);
    for line in body {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

pub fn write_ppm<P: AsRef<Path>>(path: P, canvas: &Canvas) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, encode_ppm(canvas)).map_err(|e| {
        IoError::FileSystem(e).with_context(format!("writing heatmap to {:?}", path))
    })?;
    tracing::info!(?path, side = canvas.side, "Successfully written image");
    Ok(())
}

/// Writes frame `iteration` as `<dir>/<iteration>.ppm`.
pub fn write_frame<P: AsRef<Path>>(dir: P, iteration: u64, canvas: &Canvas) -> Result<PathBuf> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir).map_err(|e| {
        IoError::FileSystem(e).with_context(format!("creating frame directory {:?}", dir))
    })?;
    let path = dir.join(format!("{iteration}.ppm"));
    write_ppm(&path, canvas)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use poolsim_data::{ParticleClass, Vector2};

    fn particle(class: ParticleClass, radius: f64, x: f64, y: f64) -> Particle {
        Particle::new(0, 0, class, 1.0, radius, Vector2::new(x, y))
    }

    #[test]
    fn test_unit_particle_marks_single_pixel() {
        let canvas = Canvas::from_particles(4, &[particle(ParticleClass::Small, 1.0, 1.5, 2.5)]);
        assert_eq!(canvas.get(1, 2), 1);
        let lit: u32 = (0..4)
            .flat_map(|y| (0..4).map(move |x| (x, y)))
            .map(|(x, y)| u32::from(canvas.get(x, y)))
            .sum();
        assert_eq!(lit, 1);
    }

    #[test]
    fn test_offsets_truncating_onto_one_row_both_paint() {
        // offsets -1 and 0 both truncate onto row 0
        let canvas = Canvas::from_particles(5, &[particle(ParticleClass::Small, 1.5, 2.5, 0.5)]);
        assert_eq!(canvas.get(1, 0), 2);
        assert_eq!(canvas.get(2, 0), 2);
        assert_eq!(canvas.get(3, 0), 2);
        assert_eq!(canvas.get(0, 0), 0);
        assert_eq!(canvas.get(2, 1), 1);
        assert_eq!(canvas.get(2, 2), 0);
    }

    #[test]
    fn test_particles_outside_canvas_are_clipped() {
        let particles = vec![
            particle(ParticleClass::Small, 1.0, 1.0, -3.0),
            particle(ParticleClass::Small, 1.0, 1.0, 9.0),
            particle(ParticleClass::Large, 2.0, 3.5, 3.5),
        ];
        let canvas = Canvas::from_particles(4, &particles);
        assert_eq!(canvas.get(3, 3), LARGE_MARK);
        assert_eq!(canvas.get(1, 0), 0);
        assert_eq!(canvas.get(0, 0), 0);
    }

    #[test]
    fn test_small_particles_saturate() {
        let crowd = vec![particle(ParticleClass::Small, 1.0, 0.0, 0.0); 300];
        let canvas = Canvas::from_particles(2, &crowd);
        assert_eq!(canvas.get(0, 0), BITMAP_MAX);
    }

    #[test]
    fn test_large_particle_wins() {
        let particles = vec![
            particle(ParticleClass::Large, 2.0, 2.0, 2.0),
            particle(ParticleClass::Small, 1.0, 2.0, 2.0),
        ];
        let canvas = Canvas::from_particles(5, &particles);
        assert_eq!(canvas.get(2, 2), LARGE_MARK);
        assert_eq!(canvas.get(3, 2), LARGE_MARK);
        assert_eq!(canvas.get(4, 4), 0);
    }

    #[test]
    fn test_from_regions_uses_world_frame() {
        let topology = Topology::new(2, 3.0).unwrap();
        let mut p = particle(ParticleClass::Small, 1.0, 1.0, 1.0);
        p.region_id = 3;
        let canvas = Canvas::from_regions(&topology, &[vec![], vec![], vec![], vec![p]]);
        assert_eq!(canvas.side(), 6);
        assert_eq!(canvas.get(4, 4), 1);
    }

    #[test]
    fn test_encode_ppm() {
        let particles = vec![
            particle(ParticleClass::Small, 1.0, 0.0, 0.0),
            particle(ParticleClass::Large, 1.0, 1.0, 1.0),
        ];
        let ppm = encode_ppm(&Canvas::from_particles(2, &particles));
        assert_eq!(ppm, "P3\n2 2\n255\n1 0 0 0 0 0\n0 0 0 0 0 255\n");
    }

    #[test]
    fn test_write_frame_names_file_by_iteration() {
        let dir = std::env::temp_dir().join(format!("poolsim_frames_{}", std::process::id()));
        let canvas = Canvas::from_particles(1, &[]);
        let path = write_frame(&dir, 7, &canvas).unwrap();
        assert!(path.ends_with("7.ppm"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "P3\n1 1\n255\n0 0 0\n");
        std::fs::remove_dir_all(&dir).ok();
    }
}
