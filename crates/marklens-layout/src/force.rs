#![forbid(unsafe_code)]

//! Force-directed layout.
//!
//! A velocity-Verlet integrator over four forces, applied in this order each
//! tick:
//!
//! 1. **Links**: springs pulling each hub/sample pair toward `link_distance`.
//! 2. **Many-body**: pairwise inverse-square repulsion; hubs push harder than
//!    samples.
//! 3. **Center**: translates the whole system so its mean sits on the canvas
//!    centre.
//! 4. **Collision**: separates overlapping circles padded by
//!    `collide_padding`.
//!
//! # Cooling
//!
//! `alpha` scales every force. Each tick moves it toward `alpha_target` by
//! `alpha_decay`, so with the default decay it falls from 1.0 below
//! `alpha_min` in about 300 ticks. The layout is stable once
//! `alpha < alpha_min`.
//!
//! # Drag
//!
//! [`ForceSimulation::drag_start`] pins a node and raises `alpha_target` to
//! 0.3, which keeps the rest of the graph moving while the pointer is down.
//! [`ForceSimulation::drag_end`] unpins and lets it cool again.
//!
//! # Determinism
//!
//! Initial placement is a phyllotaxis spiral and coincident nodes are split
//! along a fixed direction, so identical graphs always produce identical
//! layouts.

use tracing::{debug, trace};

use crate::graph::GraphModel;
use crate::viewport::Canvas;

/// Tunables for [`ForceSimulation`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceParams {
    pub link_distance: f64,
    pub link_strength: f64,
    /// Many-body strength of a hub node (negative repels).
    pub category_charge: f64,
    /// Many-body strength of a sample node.
    pub sample_charge: f64,
    pub collide_padding: f64,
    pub alpha_min: f64,
    pub alpha_decay: f64,
    pub velocity_decay: f64,
    /// `alpha_target` while a node is dragged.
    pub drag_alpha_target: f64,
}

impl Default for ForceParams {
    fn default() -> Self {
        let alpha_min = 0.001;
        Self {
            link_distance: 80.0,
            link_strength: 0.5,
            category_charge: -500.0,
            sample_charge: -100.0,
            collide_padding: 5.0,
            alpha_min,
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            velocity_decay: 0.4,
            drag_alpha_target: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Body {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
    pin: Option<(f64, f64)>,
}

const INITIAL_RADIUS: f64 = 10.0;
const MIN_DISTANCE_SQ: f64 = 1.0;

/// A running layout over a [`GraphModel`].
#[derive(Debug, Clone)]
pub struct ForceSimulation {
    graph: GraphModel,
    params: ForceParams,
    canvas: Canvas,
    bodies: Vec<Body>,
    /// Per-link bias toward moving the less-connected endpoint.
    bias: Vec<f64>,
    alpha: f64,
    alpha_target: f64,
    ticks: u64,
}

impl ForceSimulation {
    /// Start a simulation with nodes spread on a spiral around the canvas centre.
    #[must_use]
    pub fn new(graph: GraphModel, canvas: Canvas, params: ForceParams) -> Self {
        let golden_angle = std::f64::consts::PI * (3.0 - 5.0_f64.sqrt());
        let (cx, cy) = canvas.center();
        let bodies = (0..graph.nodes().len())
            .map(|i| {
                let r = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
                let a = i as f64 * golden_angle;
                Body {
                    x: cx + r * a.cos(),
                    y: cy + r * a.sin(),
                    ..Body::default()
                }
            })
            .collect();

        let mut degree = vec![0usize; graph.nodes().len()];
        for link in graph.links() {
            degree[link.source] += 1;
            degree[link.target] += 1;
        }
        let bias = graph
            .links()
            .iter()
            .map(|l| degree[l.source] as f64 / (degree[l.source] + degree[l.target]) as f64)
            .collect();

        debug!(
            nodes = graph.nodes().len(),
            links = graph.links().len(),
            "force simulation created"
        );

        Self {
            graph,
            params,
            canvas,
            bodies,
            bias,
            alpha: 1.0,
            alpha_target: 0.0,
            ticks: 0,
        }
    }

    #[must_use]
    pub fn graph(&self) -> &GraphModel {
        &self.graph
    }

    #[must_use]
    pub fn params(&self) -> &ForceParams {
        &self.params
    }

    #[must_use]
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    #[must_use]
    pub fn alpha_target(&self) -> f64 {
        self.alpha_target
    }

    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Cooled below `alpha_min`.
    #[must_use]
    pub fn is_stable(&self) -> bool {
        self.alpha < self.params.alpha_min
    }

    /// World position of node `idx`.
    #[must_use]
    pub fn position(&self, idx: usize) -> Option<(f64, f64)> {
        self.bodies.get(idx).map(|b| (b.x, b.y))
    }

    /// World position of the node with `id`.
    #[must_use]
    pub fn position_of(&self, id: &str) -> Option<(f64, f64)> {
        self.position(self.graph.index_of(id)?)
    }

    /// Topmost node whose circle contains `(x, y)`.
    ///
    /// Later nodes draw on top, so the search runs back to front.
    #[must_use]
    pub fn node_at(&self, x: f64, y: f64) -> Option<usize> {
        self.graph
            .nodes()
            .iter()
            .zip(&self.bodies)
            .enumerate()
            .rev()
            .find(|(_, (node, b))| {
                let (dx, dy) = (x - b.x, y - b.y);
                dx * dx + dy * dy <= node.radius * node.radius
            })
            .map(|(i, _)| i)
    }

    /// Raise the temperature so the layout resumes moving.
    pub fn reheat(&mut self, alpha: f64) {
        self.alpha = self.alpha.max(alpha);
    }

    /// Advance one step.
    pub fn tick(&mut self) {
        self.alpha += (self.alpha_target - self.alpha) * self.params.alpha_decay;
        self.ticks += 1;

        self.apply_links();
        self.apply_many_body();
        self.apply_center();
        self.apply_collide();

        let keep = 1.0 - self.params.velocity_decay;
        for b in &mut self.bodies {
            match b.pin {
                Some((px, py)) => {
                    b.x = px;
                    b.y = py;
                    b.vx = 0.0;
                    b.vy = 0.0;
                }
                None => {
                    b.vx *= keep;
                    b.vy *= keep;
                    b.x += b.vx;
                    b.y += b.vy;
                }
            }
        }
        trace!(alpha = self.alpha, tick = self.ticks, "force tick");
    }

    /// Tick until stable or `max_ticks` have run. Returns ticks executed.
    pub fn run(&mut self, max_ticks: usize) -> usize {
        let mut n = 0;
        while n < max_ticks && !self.is_stable() {
            self.tick();
            n += 1;
        }
        n
    }

    /// Pin node `idx` at its current position and reheat.
    ///
    /// Drags address nodes by index: ids are for lookup only and a category
    /// name may read like another category's sample id.
    pub fn drag_start(&mut self, idx: usize) -> bool {
        let Some(b) = self.bodies.get_mut(idx) else {
            return false;
        };
        b.pin = Some((b.x, b.y));
        self.alpha_target = self.params.drag_alpha_target;
        self.reheat(self.params.drag_alpha_target);
        debug!(node = %self.graph.nodes()[idx].id, idx, "drag start");
        true
    }

    /// Move the pin of a dragged node.
    pub fn drag_to(&mut self, idx: usize, x: f64, y: f64) -> bool {
        let Some(b) = self.bodies.get_mut(idx) else {
            return false;
        };
        if b.pin.is_none() {
            return false;
        }
        b.pin = Some((x, y));
        b.x = x;
        b.y = y;
        true
    }

    /// Release a dragged node and let the layout cool.
    pub fn drag_end(&mut self, idx: usize) -> bool {
        let Some(b) = self.bodies.get_mut(idx) else {
            return false;
        };
        b.pin = None;
        if self.bodies.iter().all(|b| b.pin.is_none()) {
            self.alpha_target = 0.0;
        }
        debug!(node = %self.graph.nodes()[idx].id, idx, "drag end");
        true
    }

    #[must_use]
    pub fn is_pinned(&self, idx: usize) -> bool {
        self.bodies.get(idx).is_some_and(|b| b.pin.is_some())
    }

    fn charge(&self, idx: usize) -> f64 {
        if self.graph.nodes()[idx].is_category() {
            self.params.category_charge
        } else {
            self.params.sample_charge
        }
    }

    fn apply_links(&mut self) {
        let strength = self.params.link_strength;
        let distance = self.params.link_distance;
        for (link, &bias) in self.graph.links().iter().zip(&self.bias) {
            let (s, t) = (self.bodies[link.source], self.bodies[link.target]);
            let mut x = t.x + t.vx - s.x - s.vx;
            let mut y = t.y + t.vy - s.y - s.vy;
            if x == 0.0 && y == 0.0 {
                x = 1e-6;
            }
            let l = (x * x + y * y).sqrt();
            let k = (l - distance) / l * self.alpha * strength;
            x *= k;
            y *= k;
            let target = &mut self.bodies[link.target];
            target.vx -= x * bias;
            target.vy -= y * bias;
            let source = &mut self.bodies[link.source];
            source.vx += x * (1.0 - bias);
            source.vy += y * (1.0 - bias);
        }
    }

    fn apply_many_body(&mut self) {
        let n = self.bodies.len();
        let charges: Vec<f64> = (0..n).map(|i| self.charge(i)).collect();
        let mut dv = vec![(0.0, 0.0); n];
        for i in 0..n {
            let bi = self.bodies[i];
            for (j, bj) in self.bodies.iter().enumerate() {
                if i == j {
                    continue;
                }
                let (mut dx, dy) = (bj.x - bi.x, bj.y - bi.y);
                if dx == 0.0 && dy == 0.0 {
                    // Split coincident nodes along x, in index order.
                    dx = if i < j { 1e-3 } else { -1e-3 };
                }
                let l2 = (dx * dx + dy * dy).max(MIN_DISTANCE_SQ);
                let w = charges[j] * self.alpha / l2;
                dv[i].0 += dx * w;
                dv[i].1 += dy * w;
            }
        }
        for (b, (ax, ay)) in self.bodies.iter_mut().zip(dv) {
            b.vx += ax;
            b.vy += ay;
        }
    }

    fn apply_center(&mut self) {
        if self.bodies.is_empty() {
            return;
        }
        let n = self.bodies.len() as f64;
        let (cx, cy) = self.canvas.center();
        let sx = self.bodies.iter().map(|b| b.x).sum::<f64>() / n - cx;
        let sy = self.bodies.iter().map(|b| b.y).sum::<f64>() / n - cy;
        for b in &mut self.bodies {
            b.x -= sx;
            b.y -= sy;
        }
    }

    fn apply_collide(&mut self) {
        let n = self.bodies.len();
        let radii: Vec<f64> = self
            .graph
            .nodes()
            .iter()
            .map(|node| node.radius + self.params.collide_padding)
            .collect();
        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = (self.bodies[i], self.bodies[j]);
                let ri = radii[i];
                let rj = radii[j];
                let r = ri + rj;
                let mut x = (a.x + a.vx) - (b.x + b.vx);
                let y = (a.y + a.vy) - (b.y + b.vy);
                if x == 0.0 && y == 0.0 {
                    x = 1e-3;
                }
                let l2 = x * x + y * y;
                if l2 >= r * r {
                    continue;
                }
                let l = l2.sqrt();
                let k = (r - l) / l;
                let share = (rj * rj) / (ri * ri + rj * rj);
                let (px, py) = (x * k, y * k);
                self.bodies[i].vx += px * share;
                self.bodies[i].vy += py * share;
                self.bodies[j].vx -= px * (1.0 - share);
                self.bodies[j].vy -= py * (1.0 - share);
            }
        }
    }
}
