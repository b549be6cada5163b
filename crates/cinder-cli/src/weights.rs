//! Fixed parameters for the 1-16-16-1 demo network
//!
//! Weight matrices are row-major (`rows * cols`). The values are part of
//! the demo contract: the host reference and the device path must agree on
//! them exactly.

pub const LAYER1_WEIGHTS: [f32; 16] = [
    -0.0501906, -0.510489, 0.685779, 0.198476, 0.681852, -0.267619,
    -0.272561, -0.898809, 0.701957, -0.808253, -0.311982, -0.23848,
    -0.26807, -0.403265, -0.0790979, 0.685902,
];

pub const LAYER1_BIAS: [f32; 16] = [
    0.473106, 0.265591, 0.572281, 0.225265, 0.797204, 0.354596,
    -0.152311, -0.504477, -0.066445, 0.616083, 0.170455, -0.143996,
    -0.223807, -0.319191, -0.61367, -0.0720235,
];

pub const LAYER2_WEIGHTS: [f32; 256] = [
    0.222386, 0.57585, 0.389207, -0.772596, 0.830778, -0.279337,
    0.227933, 0.0599659, 0.504088, -0.59638, 0.463528, -0.603161,
    0.148075, 0.571846, 0.125365, 0.537054, -0.362905, -0.00675879,
    0.504831, -0.229797, -0.769421, 0.141566, 0.731892, -0.733106,
    0.0612461, -0.378609, -0.372432, -0.00447413, -0.558643, -0.893935,
    0.695609, -0.0700248, -0.498046, 0.73644, -0.0701581, 0.221659,
    0.117771, -0.398855, 0.0869925, 0.303892, -0.886898, 0.313142,
    -0.259467, -0.863942, 0.215703, -0.82355, 0.78607, -0.824913,
    0.577045, -0.615653, -0.534441, -0.686171, 0.808138, -0.119598,
    0.262275, 0.267025, -0.508113, -0.398996, -0.344385, 0.503954,
    -0.786616, 0.0212501, 0.845572, 0.779953, 0.616523, 0.680311,
    -0.896713, 0.437854, -0.614177, -0.323355, -0.364669, 0.23017,
    0.661695, -0.226959, -0.385026, 0.893113, -0.561645, 0.696846,
    -0.58962, -0.779069, 0.260584, 0.341074, -0.230209, -0.384779,
    -0.37524, 0.558421, 0.379927, 0.635296, 0.242256, 0.296279,
    0.561984, 0.315572, -0.376619, -0.331078, -0.514982, 0.041471,
    -0.78481, 0.362075, -0.284, -0.18486, -0.0350874, 0.693602,
    -0.556759, -0.134302, -0.806338, -0.679507, -0.552569, -0.874041,
    -0.71063, -0.726428, 0.870354, -0.439594, 0.778589, 0.286261,
    0.885128, 0.21608, -0.512925, -0.259713, 0.322231, 0.270331,
    -0.722802, 0.489164, 0.310374, -0.0509836, 0.212234, -0.174848,
    0.296789, -0.35102, -0.651469, 0.181116, -0.0869378, 0.566597,
    -0.442954, 0.251485, 0.683262, -0.219162, 0.190819, -0.0462747,
    -0.427394, 0.693248, 0.421982, -0.766557, 0.3985, 0.0342396,
    0.864924, -0.0487681, 0.448793, -0.385227, 0.893167, 0.768053,
    0.58835, 0.881647, 0.28994, -0.00138105, 0.557366, 0.0744441,
    0.432156, 0.592185, 0.147686, 0.544662, 0.625032, 0.00468929,
    0.876322, -0.725042, -0.0838457, 0.413134, 0.785831, -0.864254,
    -0.439224, -0.569145, -0.331177, -0.612081, -0.199467, -0.432613,
    -0.653659, 0.809682, -0.232086, 0.0937694, 0.312738, -0.186774,
    0.0323816, -0.191497, 0.683633, 0.212683, 0.0299903, -0.528051,
    0.689531, 0.685705, -0.279871, 9.16888e-05, 0.737854, -0.863711,
    0.377231, 0.267326, -0.609638, -0.712861, 0.447038, -0.538043,
    0.740121, -0.311113, 0.586596, 0.515289, 0.809061, -0.837108,
    0.498344, 0.397719, -0.357738, 0.391129, 0.612367, 0.406543,
    0.244899, -0.800858, -0.73257, 0.778242, -0.228545, -0.328059,
    -0.824515, -0.218596, 0.629155, -0.436116, -0.132634, 0.373681,
    0.728014, -0.706249, -0.437224, 0.470983, 0.166837, 0.244369,
    0.104763, 0.477173, 0.576113, 0.0178573, 0.412305, -0.7797,
    -0.560591, 0.712703, 0.0462333, 0.65998, 0.800135, -0.8461,
    0.245062, -0.339149, 0.370616, -0.619046, -0.0193282, 0.614654,
    -0.192746, -0.557995, 0.582206, 0.377202, -0.536444, -0.620271,
    0.709936, -0.485111, 0.30041, -0.0588282,
];

pub const LAYER2_BIAS: [f32; 16] = [
    -0.257733, -0.292528, -0.664029, 0.252127, 0.158172, -0.251579,
    0.0726855, -0.751856, -0.164016, 0.75873, -0.519726, 0.148497,
    -0.120821, 0.0308934, -0.229742, 0.437088,
];

pub const LAYER3_WEIGHTS: [f32; 16] = [
    0.335723, 0.140114, -0.78104, -0.127241, 0.411229, -0.376454,
    0.500872, 0.194183, -0.498161, -0.886034, 0.164909, 0.468615,
    -0.208383, -0.530213, -0.788071, -0.134225,
];

pub const LAYER3_BIAS: [f32; 1] = [
    -0.182692,
];
