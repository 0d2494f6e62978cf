//! The biophysical equations of the cortical column.
//!
//! Two populations are modelled by their mean membrane voltage:
//! - the pyramidal (excitatory) population `Vp`,
//! - the interneuron (inhibitory) population `Vi`.
//!
//! Firing rates follow from the voltages through a sigmoid. They drive four post-synaptic
//! potentials (`s_ep`, `s_ei`, `s_gp`, `s_gi`), each filtered by a critically damped second
//! order kernel whose derivative is tracked as `x_*`. The PSPs open conductance-based AMPA
//! and GABA currents. Pyramidal firing loads the cells with sodium, which a Na-K pump clears
//! again, and the intracellular sodium opens a sodium-dependent potassium current (KNa) that
//! slowly hyperpolarizes the pyramidal population.
//!
//! Everything in here is a pure function of the state and the parameters.

use super::{
    integrator::{NoiseChannel, StochasticSystem},
    parameters::ColumnParameters,
};

/// The dynamic variables of the column, in storage order.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(usize)]
pub enum Variable {
    /// Pyramidal membrane voltage in mV.
    Vp,
    /// Interneuron membrane voltage in mV.
    Vi,
    /// Intracellular sodium concentration in mM.
    Na,
    /// PSP from the pyramidal onto the pyramidal population.
    s_ep,
    /// PSP from the pyramidal onto the interneuron population.
    s_ei,
    /// PSP from the interneuron onto the pyramidal population.
    s_gp,
    /// PSP from the interneuron onto the interneuron population.
    s_gi,
    /// Derivative of `s_ep`.
    x_ep,
    /// Derivative of `s_ei`.
    x_ei,
    /// Derivative of `s_gp`.
    x_gp,
    /// Derivative of `s_gi`.
    x_gi,
}

impl Variable {
    pub const COUNT: usize = 11;

    pub const ALL: [Variable; Variable::COUNT] = [
        Variable::Vp,
        Variable::Vi,
        Variable::Na,
        Variable::s_ep,
        Variable::s_ei,
        Variable::s_gp,
        Variable::s_gi,
        Variable::x_ep,
        Variable::x_ei,
        Variable::x_gp,
        Variable::x_gi,
    ];

    /// Position of the variable in the state array.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Variable::Vp => "Vp",
            Variable::Vi => "Vi",
            Variable::Na => "Na",
            Variable::s_ep => "s_ep",
            Variable::s_ei => "s_ei",
            Variable::s_gp => "s_gp",
            Variable::s_gi => "s_gi",
            Variable::x_ep => "x_ep",
            Variable::x_ei => "x_ei",
            Variable::x_gp => "x_gp",
            Variable::x_gi => "x_gi",
        }
    }

    /// Looks a variable up by its name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|variable| variable.name() == name)
    }
}

/// State of the column at one evaluation point.
pub type State = [f64; Variable::COUNT];

/// The equations of the column for a fixed set of parameters and a fixed external input.
#[derive(Debug, Clone, Copy)]
pub struct ColumnModel<'a> {
    parameters: &'a ColumnParameters,

    /// External drive onto the pyramidal-to-pyramidal PSP in ms^-1.
    input: f64,
}

impl<'a> ColumnModel<'a> {
    pub fn new(parameters: &'a ColumnParameters, input: f64) -> Self {
        Self { parameters, input }
    }

    /// The state the column starts from: both populations at their leak reversal potential,
    /// sodium at equilibrium and all PSPs at zero.
    pub fn rest_state(parameters: &ColumnParameters) -> State {
        let mut state = [0.0; Variable::COUNT];
        state[Variable::Vp.index()] = parameters.e_l_p;
        state[Variable::Vi.index()] = parameters.e_l_i;
        state[Variable::Na.index()] = parameters.na_eq;
        state
    }

    #[inline]
    fn sigmoid(&self, v: f64, q_max: f64, theta: f64, sigma: f64) -> f64 {
        q_max / (1.0 + (-self.parameters.c1 * (v - theta) / sigma).exp())
    }

    /// Firing rate of the pyramidal population in ms^-1.
    #[inline]
    pub fn firing_rate_p(&self, vp: f64) -> f64 {
        let p = self.parameters;
        self.sigmoid(vp, p.qp_max, p.theta_p, p.sigma_p)
    }

    /// Firing rate of the interneuron population in ms^-1.
    #[inline]
    pub fn firing_rate_i(&self, vi: f64) -> f64 {
        let p = self.parameters;
        self.sigmoid(vi, p.qi_max, p.theta_i, p.sigma_i)
    }

    /// AMPA current onto the pyramidal population.
    #[inline]
    pub fn i_ep(&self, s_ep: f64, vp: f64) -> f64 {
        self.parameters.g_ampa * s_ep * (vp - self.parameters.e_ampa)
    }

    /// AMPA current onto the interneuron population.
    #[inline]
    pub fn i_ei(&self, s_ei: f64, vi: f64) -> f64 {
        self.parameters.g_ampa * s_ei * (vi - self.parameters.e_ampa)
    }

    /// GABA current onto the pyramidal population.
    #[inline]
    pub fn i_gp(&self, s_gp: f64, vp: f64) -> f64 {
        self.parameters.g_gaba * s_gp * (vp - self.parameters.e_gaba)
    }

    /// GABA current onto the interneuron population.
    #[inline]
    pub fn i_gi(&self, s_gi: f64, vi: f64) -> f64 {
        self.parameters.g_gaba * s_gi * (vi - self.parameters.e_gaba)
    }

    #[inline]
    pub fn i_leak_p(&self, vp: f64) -> f64 {
        self.parameters.g_l * (vp - self.parameters.e_l_p)
    }

    #[inline]
    pub fn i_leak_i(&self, vi: f64) -> f64 {
        self.parameters.g_l * (vi - self.parameters.e_l_i)
    }

    /// Fraction of open KNa channels at sodium concentration `na`.
    #[inline]
    pub fn kna_activation(&self, na: f64) -> f64 {
        let p = self.parameters;
        p.kna_max_open / (1.0 + (p.kna_half_na / na).powf(p.kna_hill))
    }

    /// Sodium-dependent potassium current of the pyramidal population.
    #[inline]
    pub fn i_kna(&self, na: f64, vp: f64) -> f64 {
        self.parameters.g_kna * self.kna_activation(na) * (vp - self.parameters.e_k)
    }

    /// Net sodium efflux of the Na-K pump. Zero at `na_eq`.
    #[inline]
    pub fn na_pump(&self, na: f64) -> f64 {
        let p = self.parameters;
        let k3 = p.pump_half_na.powi(3);
        let saturation = |c: f64| c.powi(3) / (c.powi(3) + k3);
        p.r_pump * (saturation(na) - saturation(p.na_eq))
    }

    /// Time derivative of every variable at `state`.
    pub fn derivatives(&self, state: &State) -> State {
        let p = self.parameters;
        let value = |variable: Variable| state[variable.index()];

        let vp = value(Variable::Vp);
        let vi = value(Variable::Vi);
        let na = value(Variable::Na);
        let qp = self.firing_rate_p(vp);
        let qi = self.firing_rate_i(vi);

        // Second order PSP kernel: x' = gamma^2 (drive - s) - 2 gamma x.
        let psp = |gamma: f64, drive: f64, s: Variable, x: Variable| {
            gamma * gamma * (drive - value(s)) - 2.0 * gamma * value(x)
        };

        let mut derivative = [0.0; Variable::COUNT];

        // KNa enters already scaled by tau_p / C_m, hence it is not divided by tau_p.
        derivative[Variable::Vp.index()] = -(self.i_leak_p(vp)
            + self.i_ep(value(Variable::s_ep), vp)
            + self.i_gp(value(Variable::s_gp), vp))
            / p.tau_p
            - self.i_kna(na, vp);
        derivative[Variable::Vi.index()] = -(self.i_leak_i(vi)
            + self.i_ei(value(Variable::s_ei), vi)
            + self.i_gi(value(Variable::s_gi), vi))
            / p.tau_i;
        derivative[Variable::Na.index()] = (p.alpha_na * qp - self.na_pump(na)) / p.tau_na;

        derivative[Variable::s_ep.index()] = value(Variable::x_ep);
        derivative[Variable::s_ei.index()] = value(Variable::x_ei);
        derivative[Variable::s_gp.index()] = value(Variable::x_gp);
        derivative[Variable::s_gi.index()] = value(Variable::x_gi);

        derivative[Variable::x_ep.index()] = psp(
            p.gamma_e,
            p.n_pp * qp + p.mphi + self.input,
            Variable::s_ep,
            Variable::x_ep,
        );
        derivative[Variable::x_ei.index()] =
            psp(p.gamma_e, p.n_ip * qp, Variable::s_ei, Variable::x_ei);
        derivative[Variable::x_gp.index()] =
            psp(p.gamma_g, p.n_pi * qi, Variable::s_gp, Variable::x_gp);
        derivative[Variable::x_gi.index()] =
            psp(p.gamma_g, p.n_ii * qi, Variable::s_gi, Variable::x_gi);

        derivative
    }
}

impl StochasticSystem<{ Variable::COUNT }> for ColumnModel<'_> {
    #[inline]
    fn drift(&self, point: &State) -> State {
        self.derivatives(point)
    }

    /// The background noise enters the pyramidal-to-pyramidal PSP through the same
    /// `gamma_e^2` gain as the deterministic drive.
    fn noise_channel(&self) -> Option<NoiseChannel> {
        let p = self.parameters;
        Some(NoiseChannel {
            index: Variable::x_ep.index(),
            amplitude: p.gamma_e * p.gamma_e * p.dphi,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn variable_names_round_trip() {
        for (index, variable) in Variable::ALL.into_iter().enumerate() {
            assert_eq!(variable.index(), index);
            assert_eq!(Variable::from_name(variable.name()), Some(variable));
        }
        assert_eq!(Variable::from_name("V_p"), None);
    }

    #[test]
    fn sigmoid_is_half_maximal_at_threshold() {
        let parameters = ColumnParameters::default();
        let model = ColumnModel::new(&parameters, 0.0);

        assert!(close(
            model.firing_rate_p(parameters.theta_p),
            parameters.qp_max / 2.0
        ));
        assert!(close(
            model.firing_rate_i(parameters.theta_i),
            parameters.qi_max / 2.0
        ));
    }

    #[test]
    fn sigmoid_is_increasing_and_bounded() {
        let parameters = ColumnParameters::default();
        let model = ColumnModel::new(&parameters, 0.0);

        let mut previous_p = 0.0;
        let mut previous_i = 0.0;
        let mut v = -90.0;

        while v <= -20.0 {
            let qp = model.firing_rate_p(v);
            let qi = model.firing_rate_i(v);

            assert!(qp > previous_p && qp < parameters.qp_max, "Qp({}) = {}", v, qp);
            assert!(qi > previous_i && qi < parameters.qi_max, "Qi({}) = {}", v, qi);

            previous_p = qp;
            previous_i = qi;
            v += 0.5;
        }
    }

    #[test]
    fn sigma_p_controls_the_slope() {
        let steep = ColumnParameters::with_free([3.0, 1.33, 0.0].into());
        let shallow = ColumnParameters::with_free([6.0, 1.33, 0.0].into());
        let v = -55.0;

        let steep_rate = ColumnModel::new(&steep, 0.0).firing_rate_p(v);
        let shallow_rate = ColumnModel::new(&shallow, 0.0).firing_rate_p(v);
        assert!(steep_rate > shallow_rate);
    }

    #[test]
    fn currents_vanish_at_their_reversal_potentials() {
        let parameters = ColumnParameters::default();
        let model = ColumnModel::new(&parameters, 0.0);

        assert_eq!(model.i_ep(0.7, parameters.e_ampa), 0.0);
        assert_eq!(model.i_ei(0.7, parameters.e_ampa), 0.0);
        assert_eq!(model.i_gp(0.7, parameters.e_gaba), 0.0);
        assert_eq!(model.i_gi(0.7, parameters.e_gaba), 0.0);
        assert_eq!(model.i_leak_p(parameters.e_l_p), 0.0);
        assert_eq!(model.i_leak_i(parameters.e_l_i), 0.0);
        assert_eq!(model.i_kna(20.0, parameters.e_k), 0.0);

        // Inhibition hyperpolarizes a depolarized population (positive outward current).
        assert!(model.i_gp(0.5, -60.0) > 0.0);
        assert!(model.i_ep(0.5, -60.0) < 0.0);
    }

    #[test]
    fn kna_activation_saturates_with_sodium() {
        let parameters = ColumnParameters::default();
        let model = ColumnModel::new(&parameters, 0.0);

        let low = model.kna_activation(5.0);
        let mid = model.kna_activation(parameters.kna_half_na);
        let high = model.kna_activation(500.0);

        assert!(low < mid && mid < high);
        assert!(close(mid, parameters.kna_max_open / 2.0));
        assert!(high < parameters.kna_max_open);
    }

    #[test]
    fn pump_restores_equilibrium_sodium() {
        let parameters = ColumnParameters::default();
        let model = ColumnModel::new(&parameters, 0.0);

        assert_eq!(model.na_pump(parameters.na_eq), 0.0);
        assert!(model.na_pump(parameters.na_eq + 2.0) > 0.0);
        assert!(model.na_pump(parameters.na_eq - 2.0) < 0.0);
        assert!(model.na_pump(1.0e6) < parameters.r_pump);
    }

    #[test]
    fn psp_derivatives_follow_their_velocity() {
        let parameters = ColumnParameters::default();
        let model = ColumnModel::new(&parameters, 0.0);
        let mut state = ColumnModel::rest_state(&parameters);
        state[Variable::x_ep.index()] = 0.1;
        state[Variable::x_gi.index()] = -0.2;

        let derivative = model.derivatives(&state);

        assert_eq!(derivative[Variable::s_ep.index()], 0.1);
        assert_eq!(derivative[Variable::s_gi.index()], -0.2);
        assert_eq!(derivative[Variable::s_ei.index()], 0.0);
    }

    #[test]
    fn input_drives_only_the_pyramidal_psp() {
        let parameters = ColumnParameters::default();
        let state = ColumnModel::rest_state(&parameters);

        let quiet = ColumnModel::new(&parameters, 0.0).derivatives(&state);
        let driven = ColumnModel::new(&parameters, 5.0).derivatives(&state);

        let gamma_sq = parameters.gamma_e * parameters.gamma_e;
        let x_ep = Variable::x_ep.index();
        assert!((driven[x_ep] - quiet[x_ep] - gamma_sq * 5.0).abs() < 1e-12);

        for variable in Variable::ALL {
            if variable != Variable::x_ep {
                assert_eq!(driven[variable.index()], quiet[variable.index()]);
            }
        }
    }

    #[test]
    fn kna_hyperpolarizes_at_rest() {
        let parameters = ColumnParameters::default();
        let state = ColumnModel::rest_state(&parameters);

        let derivative = ColumnModel::new(&parameters, 0.0).derivatives(&state);
        assert!(derivative[Variable::Vp.index()] < 0.0);

        let mut without_kna = parameters.clone();
        without_kna.g_kna = 0.0;
        let derivative = ColumnModel::new(&without_kna, 0.0).derivatives(&state);
        assert_eq!(derivative[Variable::Vp.index()], 0.0);
    }

    #[test]
    fn noise_enters_the_pyramidal_psp_velocity() {
        let parameters = ColumnParameters::with_free([4.0, 1.33, 3.0].into());
        let model = ColumnModel::new(&parameters, 0.0);

        let channel = model.noise_channel().unwrap();
        assert_eq!(channel.index, Variable::x_ep.index());
        assert!(close(channel.amplitude, 70.0e-3 * 70.0e-3 * 3.0));
    }
}
